use serde::{Deserialize, Serialize};

use crate::backend::ActionBackend;
use crate::error::ActionError;

/// 文本自动处理设置：复制 → 粘贴 → 回车
///
/// 字段只能通过 setter 修改：打开后面的步骤会同时打开前面的步骤，
/// 关闭前面的步骤会同时关闭后面的步骤。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TextAutoProcessFlags")]
pub struct TextAutoProcessConfig {
    auto_copy: bool,
    auto_paste: bool,
    auto_enter: bool,
}

/// 配置文件中的原始开关，可能不一致
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct TextAutoProcessFlags {
    auto_copy: bool,
    auto_paste: bool,
    auto_enter: bool,
}

impl From<TextAutoProcessFlags> for TextAutoProcessConfig {
    fn from(flags: TextAutoProcessFlags) -> Self {
        let mut config = TextAutoProcessConfig::disabled();
        config.set_auto_copy(flags.auto_copy);
        if flags.auto_paste {
            config.set_auto_paste(true);
        }
        if flags.auto_enter {
            config.set_auto_enter(true);
        }
        config
    }
}

impl Default for TextAutoProcessConfig {
    /// 默认只自动复制
    fn default() -> Self {
        Self {
            auto_copy: true,
            auto_paste: false,
            auto_enter: false,
        }
    }
}

impl TextAutoProcessConfig {
    pub fn disabled() -> Self {
        Self {
            auto_copy: false,
            auto_paste: false,
            auto_enter: false,
        }
    }

    pub fn auto_copy(&self) -> bool {
        self.auto_copy
    }

    pub fn auto_paste(&self) -> bool {
        self.auto_paste
    }

    pub fn auto_enter(&self) -> bool {
        self.auto_enter
    }

    pub fn set_auto_copy(&mut self, on: bool) {
        self.auto_copy = on;
        if !on {
            self.auto_paste = false;
            self.auto_enter = false;
        }
    }

    pub fn set_auto_paste(&mut self, on: bool) {
        self.auto_paste = on;
        if on {
            self.auto_copy = true;
        } else {
            self.auto_enter = false;
        }
    }

    pub fn set_auto_enter(&mut self, on: bool) {
        self.auto_enter = on;
        if on {
            self.auto_copy = true;
            self.auto_paste = true;
        }
    }
}

/// 路由之后对原始文本的处理
#[derive(Debug, Default, Clone, Copy)]
pub struct TextPostProcessor;

impl TextPostProcessor {
    /// 依次执行复制、粘贴、回车，每一步都重新检查自己的开关；某一步失败则停止
    pub async fn apply(
        &self,
        text: &str,
        config: &TextAutoProcessConfig,
        backend: &dyn ActionBackend,
    ) -> Result<(), ActionError> {
        if !config.auto_copy() {
            return Ok(());
        }
        // 剪贴板是进程间共享资源，后写覆盖先写
        backend.write_clipboard(text).await?;

        if !config.auto_paste() {
            return Ok(());
        }
        backend.paste_keystroke().await?;

        if config.auto_enter() {
            backend.enter_keystroke().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(config: TextAutoProcessConfig) -> (bool, bool, bool) {
        (config.auto_copy(), config.auto_paste(), config.auto_enter())
    }

    #[test]
    fn paste_forces_copy_and_leaves_enter() {
        let mut config = TextAutoProcessConfig::disabled();
        config.set_auto_paste(true);
        assert_eq!(flags(config), (true, true, false));
    }

    #[test]
    fn enter_forces_everything_before_it() {
        let mut config = TextAutoProcessConfig::disabled();
        config.set_auto_enter(true);
        assert_eq!(flags(config), (true, true, true));
    }

    #[test]
    fn disabling_copy_disables_later_stages() {
        let mut config = TextAutoProcessConfig::disabled();
        config.set_auto_enter(true);
        config.set_auto_copy(false);
        assert_eq!(flags(config), (false, false, false));
    }

    #[test]
    fn disabling_paste_keeps_copy() {
        let mut config = TextAutoProcessConfig::disabled();
        config.set_auto_enter(true);
        config.set_auto_paste(false);
        assert_eq!(flags(config), (true, false, false));
    }

    #[test]
    fn disabling_enter_only_touches_enter() {
        let mut config = TextAutoProcessConfig::disabled();
        config.set_auto_enter(true);
        config.set_auto_enter(false);
        assert_eq!(flags(config), (true, true, false));
    }

    #[test]
    fn inconsistent_file_is_normalized() {
        let config: TextAutoProcessConfig =
            toml::from_str("auto_copy = false\nauto_paste = false\nauto_enter = true").unwrap();
        assert_eq!(flags(config), (true, true, true));

        let config: TextAutoProcessConfig = toml::from_str("auto_paste = true").unwrap();
        assert_eq!(flags(config), (true, true, false));
    }

    #[test]
    fn serializes_field_names() {
        let text = toml::to_string(&TextAutoProcessConfig::default()).unwrap();
        assert!(text.contains("auto_copy = true"));
        assert!(text.contains("auto_paste = false"));
    }
}
