#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use talk_to_computer::backend::ActionBackend;
use talk_to_computer::embedding::EmbeddingProvider;
use talk_to_computer::error::{ActionError, Diagnostic, ProviderError, StoreError};
use talk_to_computer::store::CommandStore;
use talk_to_computer::{Command, CommandKind};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// 查表得到向量，可选延迟与失败
#[derive(Default)]
pub struct TableEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    failing: Vec<String>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.push(text.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if text.is_empty() {
            return Err(ProviderError::EmptyInput);
        }
        if self.failing.iter().any(|t| t == text) {
            return Err(ProviderError::Status(429));
        }
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| ProviderError::Request(format!("no vector for {text}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenUrl(String),
    LaunchProcess(String),
    RunShell(String),
    WriteClipboard(String),
    Paste,
    Enter,
}

/// 记录所有动作；`fail_all` 时每个动作都报错（但仍然记录）
#[derive(Default)]
pub struct RecordingBackend {
    actions: Mutex<Vec<Action>>,
    fail_all: bool,
}

impl RecordingBackend {
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: Action) -> Result<(), ActionError> {
        let target = format!("{action:?}");
        self.actions.lock().unwrap().push(action);
        if self.fail_all {
            return Err(ActionError::Spawn {
                target,
                reason: "refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ActionBackend for RecordingBackend {
    async fn open_url(&self, url: &str) -> Result<(), ActionError> {
        self.record(Action::OpenUrl(url.to_string()))
    }

    async fn launch_process(&self, id: &str) -> Result<(), ActionError> {
        self.record(Action::LaunchProcess(id.to_string()))
    }

    async fn run_shell(&self, command_line: &str) -> Result<(), ActionError> {
        self.record(Action::RunShell(command_line.to_string()))
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), ActionError> {
        self.record(Action::WriteClipboard(text.to_string()))
    }

    async fn paste_keystroke(&self) -> Result<(), ActionError> {
        self.record(Action::Paste)
    }

    async fn enter_keystroke(&self) -> Result<(), ActionError> {
        self.record(Action::Enter)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    commands: Mutex<Vec<Command>>,
    pub saves: AtomicUsize,
}

impl MemoryStore {
    pub fn with(commands: Vec<Command>) -> Self {
        Self {
            commands: Mutex::new(commands),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn stored(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }
}

impl CommandStore for MemoryStore {
    fn load(&self) -> Result<Vec<Command>, StoreError> {
        Ok(self.commands.lock().unwrap().clone())
    }

    fn save(&self, commands: &[Command]) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.commands.lock().unwrap() = commands.to_vec();
        Ok(())
    }
}

pub fn diagnostics() -> (UnboundedSender<Diagnostic>, UnboundedReceiver<Diagnostic>) {
    unbounded_channel()
}

pub fn drain(rx: &mut UnboundedReceiver<Diagnostic>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    while let Ok(d) = rx.try_recv() {
        out.push(d);
    }
    out
}

/// 必应 + 知乎
pub fn bing_and_zhihu() -> Vec<Command> {
    vec![
        Command::new("必应", CommandKind::Url, "https://cn.bing.com"),
        Command::new("知乎", CommandKind::Url, "https://www.zhihu.com"),
    ]
}

/// 必应 = e1，知乎 = e2；"打开知乎" 与知乎 0.82、与必应 0.3
pub fn scenario_embedder() -> TableEmbedder {
    TableEmbedder::new(&[
        ("必应", vec![1.0, 0.0]),
        ("知乎", vec![0.0, 1.0]),
        ("打开知乎", vec![0.3, 0.82]),
        ("随便说点什么", vec![0.2, 0.35]),
        ("知乎搜索typescript", vec![0.0, 1.0]),
    ])
}

pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
