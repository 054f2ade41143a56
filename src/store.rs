use std::fs;
use std::path::{Path, PathBuf};

use crate::command::{default_commands, Command};
use crate::config::app_dir;
use crate::error::StoreError;

/// 快捷指令的持久化
pub trait CommandStore: Send + Sync {
    fn load(&self) -> Result<Vec<Command>, StoreError>;
    fn save(&self, commands: &[Command]) -> Result<(), StoreError>;
}

/// JSON 文件存储：用户调整后的列表 + 一份默认列表
#[derive(Debug, Clone)]
pub struct JsonCommandStore {
    path: PathBuf,
    default_path: PathBuf,
}

impl JsonCommandStore {
    /// 使用应用目录下的 shortcut/shortcut.json
    pub fn new() -> Self {
        Self::in_dir(&app_dir().join("shortcut"))
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join("shortcut.json"),
            default_path: dir.join("shortcut_default.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 首次使用时写入默认指令，之后直接读取用户文件
    pub fn init(&self) -> Result<Vec<Command>, StoreError> {
        let defaults = default_commands();
        if !self.default_path.exists() {
            write_commands(&self.default_path, &defaults)?;
        }
        if !self.path.exists() {
            write_commands(&self.path, &defaults)?;
            log::info!("已写入默认快捷指令: {}", self.path.display());
        }
        self.load()
    }

}

impl Default for JsonCommandStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStore for JsonCommandStore {
    fn load(&self) -> Result<Vec<Command>, StoreError> {
        read_commands(&self.path)
    }

    fn save(&self, commands: &[Command]) -> Result<(), StoreError> {
        write_commands(&self.path, commands)
    }
}

fn read_commands(path: &Path) -> Result<Vec<Command>, StoreError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// 向量不落盘，每次启动重新计算
fn write_commands(path: &Path, commands: &[Command]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let stripped: Vec<Command> = commands
        .iter()
        .map(|c| Command {
            embedding: None,
            ..c.clone()
        })
        .collect();
    fs::write(path, serde_json::to_string_pretty(&stripped)?)?;
    Ok(())
}
