pub mod backend;
pub mod catalog;
pub mod command;
pub mod config;
pub mod embedding;
pub mod error;
pub mod executor;
pub mod router;
pub mod search;
pub mod similarity;
pub mod store;
pub mod text_process;

use std::sync::Arc;

use backend::SystemBackend;
use config::load_config;
use embedding::SiliconFlowEmbedding;
use error::{report, ConfigurationError, Diagnostic, DiagnosticSender};
use executor::ComputerExecutor;
use store::JsonCommandStore;
use tokio::io::{AsyncBufReadExt, BufReader};

pub use command::{Command, CommandKind};
pub use executor::format_outcome;
pub use router::{IntentRouter, RouteOutcome};

/// 启动时检查 key：未填写或查询余额失败都报告为配置错误
async fn check_account(embedder: &SiliconFlowEmbedding, diagnostics: &DiagnosticSender) -> bool {
    if let Err(e) = embedder.check_credentials() {
        report(diagnostics, e);
        return false;
    }
    match embedder.balance().await {
        Ok(balance) => {
            log::info!("key ok. {balance}");
            true
        }
        Err(e) => {
            report(diagnostics, ConfigurationError::InvalidApiKey(e));
            false
        }
    }
}

/// 命令行宿主：每行输入一句话，输出处理结果
pub async fn run() {
    env_logger::init();

    let config = load_config().unwrap_or_else(|e| {
        log::error!("加载配置失败: {e}，使用默认配置");
        config::AppConfig::default()
    });

    let (diag_tx, mut diag_rx) = tokio::sync::mpsc::unbounded_channel::<Diagnostic>();
    tokio::spawn(async move {
        while let Some(diagnostic) = diag_rx.recv().await {
            eprintln!("[诊断] {diagnostic}");
        }
    });

    let store = JsonCommandStore::new();
    if let Err(e) = store.init() {
        log::error!("初始化快捷指令失败: {e}");
    }

    let embedder = SiliconFlowEmbedding::new(&config.embedding);
    check_account(&embedder, &diag_tx).await;

    let executor = ComputerExecutor::from_config(
        &config,
        Arc::new(store),
        Arc::new(embedder),
        Arc::new(SystemBackend::new()),
        diag_tx.clone(),
    );
    if let Err(e) = executor.init().await {
        log::error!("推理单元初始化失败: {e}");
        let _ = diag_tx.send(ConfigurationError::CatalogNotReady(e.to_string()).into());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => println!("{}", executor.reason(&line).await),
            Ok(None) => break,
            Err(e) => {
                log::error!("读取输入失败: {e}");
                break;
            }
        }
    }
}
