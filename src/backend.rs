use async_trait::async_trait;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use crate::command::{Command, CommandKind};
use crate::error::ActionError;

/// 操作系统动作：打开网页、启动程序、剪贴板与键盘
///
/// 每个动作独立报告成败，路由层不会根据执行结果改变决策。
#[async_trait]
pub trait ActionBackend: Send + Sync {
    async fn open_url(&self, url: &str) -> Result<(), ActionError>;
    async fn launch_process(&self, id: &str) -> Result<(), ActionError>;
    async fn run_shell(&self, command_line: &str) -> Result<(), ActionError>;
    async fn write_clipboard(&self, text: &str) -> Result<(), ActionError>;
    async fn paste_keystroke(&self) -> Result<(), ActionError>;
    async fn enter_keystroke(&self) -> Result<(), ActionError>;
}

/// 按指令类型执行
pub async fn execute_command(backend: &dyn ActionBackend, command: &Command) -> Result<(), ActionError> {
    match command.kind {
        CommandKind::Url => backend.open_url(&command.value).await,
        CommandKind::ProcessLaunch => backend.launch_process(&command.value).await,
        CommandKind::CopyText => backend.write_clipboard(&command.value).await,
        CommandKind::ShellExec => backend.run_shell(&command.value).await,
    }
}

/// 纯数字的启动 id 视为 steam 游戏
pub fn steam_uri(id: &str) -> Option<String> {
    let id = id.trim();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Some(format!("steam://rungameid/{id}"))
    } else {
        None
    }
}

/// cmd 的 start 参数，网址要加引号，否则 `&` 会被 cmd 当成命令分隔符
#[cfg_attr(not(windows), allow(dead_code))]
fn start_args(target: &str) -> String {
    format!("/C start \"\" \"{target}\"")
}

/// 用系统默认程序打开网址或 URI 的命令行
#[cfg(windows)]
fn open_command(target: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("cmd");
    cmd.raw_arg(start_args(target));
    cmd
}

#[cfg(target_os = "macos")]
fn open_command(target: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("open");
    cmd.arg(target);
    cmd
}

#[cfg(not(any(windows, target_os = "macos")))]
fn open_command(target: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("xdg-open");
    cmd.arg(target);
    cmd
}

fn shell_command(command_line: &str) -> tokio::process::Command {
    if cfg!(target_os = "windows") {
        let mut cmd = tokio::process::Command::new("cmd");
        cmd.args(["/C", command_line]);
        cmd
    } else {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.args(["-c", command_line]);
        cmd
    }
}

async fn run_to_completion(mut cmd: tokio::process::Command, target: &str) -> Result<(), ActionError> {
    let status = cmd.status().await.map_err(|e| ActionError::Spawn {
        target: target.to_string(),
        reason: e.to_string(),
    })?;
    if !status.success() {
        return Err(ActionError::ExitStatus {
            target: target.to_string(),
            code: status.code(),
        });
    }
    Ok(())
}

/// 在阻塞线程里操作键盘
async fn with_keyboard<F>(f: F) -> Result<(), ActionError>
where
    F: FnOnce(&mut Enigo) -> Result<(), String> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| format!("初始化 enigo 失败: {e}"))?;
        f(&mut enigo)
    })
    .await
    .map_err(|e| ActionError::Keyboard(e.to_string()))?
    .map_err(ActionError::Keyboard)
}

/// 真实的系统实现：enigo 模拟按键，arboard 写剪贴板
#[derive(Debug, Default, Clone)]
pub struct SystemBackend;

impl SystemBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActionBackend for SystemBackend {
    async fn open_url(&self, url: &str) -> Result<(), ActionError> {
        log::info!("打开网页: {url}");
        run_to_completion(open_command(url), url).await
    }

    async fn launch_process(&self, id: &str) -> Result<(), ActionError> {
        if let Some(uri) = steam_uri(id) {
            log::info!("启动 steam 游戏: {uri}");
            return run_to_completion(open_command(&uri), &uri).await;
        }

        let program = id.trim();
        if program.is_empty() {
            return Err(ActionError::InvalidValue("启动程序为空".to_string()));
        }
        log::info!("启动程序: {program}");
        // 程序常驻运行，只确认能启动
        tokio::process::Command::new(program)
            .spawn()
            .map(|_| ())
            .map_err(|e| ActionError::Spawn {
                target: program.to_string(),
                reason: e.to_string(),
            })
    }

    async fn run_shell(&self, command_line: &str) -> Result<(), ActionError> {
        if command_line.trim().is_empty() {
            return Err(ActionError::InvalidValue("命令为空".to_string()));
        }
        log::info!("执行命令: {command_line}");
        run_to_completion(shell_command(command_line), command_line).await
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), ActionError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| format!("打开剪贴板失败: {e}"))?;
            clipboard
                .set_text(text)
                .map_err(|e| format!("写入剪贴板失败: {e}"))?;
            // 短暂延迟确保剪贴板就绪
            std::thread::sleep(std::time::Duration::from_millis(50));
            Ok::<(), String>(())
        })
        .await
        .map_err(|e| ActionError::Clipboard(e.to_string()))?
        .map_err(ActionError::Clipboard)
    }

    async fn paste_keystroke(&self) -> Result<(), ActionError> {
        with_keyboard(|enigo| {
            let modifier = if cfg!(target_os = "macos") {
                Key::Meta
            } else {
                Key::Control
            };
            enigo
                .key(modifier, Direction::Press)
                .map_err(|e| format!("按键失败: {e}"))?;
            let pressed = enigo
                .key(Key::Unicode('v'), Direction::Click)
                .map_err(|e| format!("按键失败: {e}"));
            // 无论 V 是否成功都释放修饰键
            enigo
                .key(modifier, Direction::Release)
                .map_err(|e| format!("释放按键失败: {e}"))?;
            pressed
        })
        .await
    }

    async fn enter_keystroke(&self) -> Result<(), ActionError> {
        with_keyboard(|enigo| {
            enigo
                .key(Key::Return, Direction::Click)
                .map_err(|e| format!("回车失败: {e}"))
        })
        .await
    }
}
