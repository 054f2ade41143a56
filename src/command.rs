use serde::{Deserialize, Serialize};

/// 快捷指令类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// 打开网页
    #[serde(alias = "网页")]
    Url,
    /// 启动程序或 steam 游戏
    #[serde(alias = "steam", alias = "软件")]
    ProcessLaunch,
    /// 把文本写入剪贴板
    #[serde(alias = "文本")]
    CopyText,
    /// 执行命令行
    #[serde(alias = "执行命令")]
    ShellExec,
}

/// 快捷指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// 指令名称，同时也是向量化的文本
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CommandKind,
    /// 网址、游戏 id、文本或命令行
    pub value: String,
    /// 仅在建立索引后存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Command {
    pub fn new(name: impl Into<String>, kind: CommandKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            embedding: None,
        }
    }
}

/// 默认快捷指令
pub fn default_commands() -> Vec<Command> {
    use CommandKind::{ProcessLaunch, Url};

    vec![
        // 网页
        Command::new("必应", Url, "https://cn.bing.com"),
        Command::new("谷歌", Url, "https://www.google.com"),
        Command::new("知乎", Url, "https://www.zhihu.com"),
        Command::new("哔哩哔哩", Url, "https://www.bilibili.com"),
        Command::new("小红书", Url, "https://www.xiaohongshu.com"),
        Command::new("Github", Url, "https://github.com"),
        Command::new("给鲸鱼发消息", Url, "https://chat.deepseek.com"),
        // 游戏
        Command::new("玩传送门", ProcessLaunch, "620"),
        Command::new("玩CS", ProcessLaunch, "730"),
        Command::new("玩dota2", ProcessLaunch, "570"),
        Command::new("玩GTA5", ProcessLaunch, "271590"),
        Command::new("玩蔚蓝", ProcessLaunch, "504230"),
        Command::new("玩黑神话悟空", ProcessLaunch, "2358720"),
    ]
}
