mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::*;
use talk_to_computer::config::AppConfig;
use talk_to_computer::error::{Diagnostic, RebuildError};
use talk_to_computer::executor::{ComputerExecutor, EMPTY_INPUT_MESSAGE};
use talk_to_computer::text_process::TextAutoProcessConfig;
use talk_to_computer::{Command, CommandKind};
use tokio::sync::mpsc::UnboundedReceiver;

struct Harness {
    executor: ComputerExecutor,
    backend: Arc<RecordingBackend>,
    store: Arc<MemoryStore>,
    embedder: Arc<TableEmbedder>,
    rx: UnboundedReceiver<Diagnostic>,
}

fn harness_with(
    commands: Vec<Command>,
    embedder: TableEmbedder,
    backend: RecordingBackend,
    text_config: TextAutoProcessConfig,
) -> Harness {
    let backend = arc(backend);
    let store = arc(MemoryStore::with(commands));
    let embedder = arc(embedder);
    let (tx, rx) = diagnostics();
    let mut config = AppConfig::default();
    config.text_auto_process = text_config;
    let executor = ComputerExecutor::from_config(
        &config,
        store.clone(),
        embedder.clone(),
        backend.clone(),
        tx,
    );
    Harness {
        executor,
        backend,
        store,
        embedder,
        rx,
    }
}

fn harness(text_config: TextAutoProcessConfig) -> Harness {
    harness_with(
        bing_and_zhihu(),
        scenario_embedder(),
        RecordingBackend::default(),
        text_config,
    )
}

#[tokio::test]
async fn matched_command_fires_and_reports_percentage() {
    let h = harness(TextAutoProcessConfig::disabled());
    h.executor.init().await.unwrap();

    let reply = h.executor.reason("打开知乎").await;
    assert_eq!(reply, "最相似（82%）：知乎 执行");
    assert_eq!(
        h.backend.actions(),
        [Action::OpenUrl("https://www.zhihu.com".to_string())]
    );
}

#[tokio::test]
async fn below_threshold_names_closest_and_does_nothing() {
    let h = harness(TextAutoProcessConfig::disabled());
    h.executor.init().await.unwrap();

    let reply = h.executor.reason("随便说点什么").await;
    assert_eq!(reply, "最相似（35%）：知乎 不执行");
    assert!(h.backend.actions().is_empty());
}

#[tokio::test]
async fn empty_input_touches_nothing() {
    let mut config = TextAutoProcessConfig::disabled();
    config.set_auto_enter(true);
    let h = harness(config);
    h.executor.init().await.unwrap();
    let calls = h.embedder.calls();

    assert_eq!(h.executor.reason("").await, EMPTY_INPUT_MESSAGE);
    assert!(h.backend.actions().is_empty());
    assert_eq!(h.embedder.calls(), calls);
}

#[tokio::test]
async fn search_runs_then_text_is_copied() {
    let h = harness(TextAutoProcessConfig::default());
    h.executor.init().await.unwrap();

    let reply = h.executor.reason("知乎搜索typescript").await;
    assert_eq!(reply, "搜索（知乎）：typescript");
    assert_eq!(
        h.backend.actions(),
        [
            Action::OpenUrl("https://www.zhihu.com/search?q=typescript&type=content".to_string()),
            Action::WriteClipboard("知乎搜索typescript".to_string()),
        ]
    );
}

#[tokio::test]
async fn post_processing_runs_regardless_of_outcome() {
    let mut config = TextAutoProcessConfig::disabled();
    config.set_auto_enter(true);
    let h = harness(config);
    h.executor.init().await.unwrap();

    h.executor.reason("随便说点什么").await;
    assert_eq!(
        h.backend.actions(),
        [
            Action::WriteClipboard("随便说点什么".to_string()),
            Action::Paste,
            Action::Enter,
        ]
    );
}

#[tokio::test]
async fn text_config_changes_apply_to_next_utterance() {
    let h = harness(TextAutoProcessConfig::disabled());
    h.executor.init().await.unwrap();

    let mut config = h.executor.text_config();
    config.set_auto_paste(true);
    h.executor.set_text_config(config);
    assert!(h.executor.text_config().auto_copy());
    assert!(!h.executor.text_config().auto_enter());

    h.executor.reason("随便说点什么").await;
    assert_eq!(
        h.backend.actions(),
        [Action::WriteClipboard("随便说点什么".to_string()), Action::Paste]
    );
}

#[tokio::test]
async fn execution_failure_keeps_wording_and_reports() {
    let mut h = harness_with(
        bing_and_zhihu(),
        scenario_embedder(),
        RecordingBackend::failing(),
        TextAutoProcessConfig::default(),
    );
    h.executor.init().await.unwrap();

    let reply = h.executor.reason("打开知乎").await;
    assert_eq!(reply, "最相似（82%）：知乎 执行");
    // 打开网页失败；写剪贴板失败后不再粘贴
    assert_eq!(
        h.backend.actions(),
        [
            Action::OpenUrl("https://www.zhihu.com".to_string()),
            Action::WriteClipboard("打开知乎".to_string()),
        ]
    );
    let reported = drain(&mut h.rx);
    assert_eq!(reported.len(), 2);
    assert!(reported.iter().all(|d| matches!(d, Diagnostic::Action(_))));
}

#[tokio::test]
async fn failed_init_degrades_to_no_match() {
    let mut h = harness_with(
        bing_and_zhihu(),
        scenario_embedder().failing_on("知乎"),
        RecordingBackend::default(),
        TextAutoProcessConfig::disabled(),
    );

    let err = h.executor.init().await.unwrap_err();
    assert!(matches!(
        err,
        Diagnostic::Rebuild(RebuildError::Embedding { ref command, .. }) if command == "知乎"
    ));
    assert!(!h.executor.is_ready());

    let reply = h.executor.reason("打开知乎").await;
    assert_eq!(reply, "未匹配到快捷指令 不执行");
    assert!(h.backend.actions().is_empty());
    assert!(drain(&mut h.rx).is_empty());
}

#[tokio::test]
async fn provider_outage_still_answers() {
    let mut h = harness_with(
        bing_and_zhihu(),
        scenario_embedder().failing_on("打开知乎"),
        RecordingBackend::default(),
        TextAutoProcessConfig::disabled(),
    );
    h.executor.init().await.unwrap();

    assert_eq!(h.executor.reason("打开知乎").await, "未匹配到快捷指令 不执行");
    assert!(matches!(drain(&mut h.rx).as_slice(), [Diagnostic::Provider(_)]));

    // 下一句重新请求
    assert_eq!(h.executor.reason("随便说点什么").await, "最相似（35%）：知乎 不执行");
}

#[tokio::test]
async fn editing_commands_saves_and_reindexes() {
    let h = harness(TextAutoProcessConfig::disabled());
    h.executor.init().await.unwrap();

    let edited = vec![Command::new("知乎", CommandKind::Url, "https://zhuanlan.zhihu.com")];
    h.executor.update_commands(edited.clone()).await.unwrap();

    assert_eq!(h.store.saves.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.stored(), edited);
    assert!(h.executor.is_ready());
    assert_eq!(h.executor.commands().len(), 1);

    assert_eq!(h.executor.reason("打开知乎").await, "最相似（82%）：知乎 执行");
    assert_eq!(
        h.backend.actions(),
        [Action::OpenUrl("https://zhuanlan.zhihu.com".to_string())]
    );
}

#[tokio::test]
async fn rebuild_can_be_retried_after_failure() {
    let h = harness_with(
        vec![Command::new("新指令", CommandKind::Url, "https://example.com")],
        scenario_embedder(),
        RecordingBackend::default(),
        TextAutoProcessConfig::disabled(),
    );
    assert!(h.executor.init().await.is_err());
    assert!(!h.executor.is_ready());

    h.executor
        .update_commands(bing_and_zhihu())
        .await
        .unwrap();
    assert!(h.executor.is_ready());
    assert!(h.executor.rebuild_index().await.is_ok());
}
