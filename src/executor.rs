use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::ActionBackend;
use crate::catalog::CommandCatalog;
use crate::command::Command;
use crate::config::AppConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{report, Diagnostic, DiagnosticSender};
use crate::router::{IntentRouter, RouteOutcome};
use crate::search::SearchPrefixMatcher;
use crate::store::CommandStore;
use crate::text_process::{TextAutoProcessConfig, TextPostProcessor};

/// 空输入时返回的提示
pub const EMPTY_INPUT_MESSAGE: &str = "空字符串 不处理";

/// 把路由结果格式化为界面上显示的文字
pub fn format_outcome(outcome: &RouteOutcome) -> String {
    match outcome {
        RouteOutcome::EmptyInput => EMPTY_INPUT_MESSAGE.to_string(),
        RouteOutcome::SearchExecuted { engine, query } => {
            format!("搜索（{}）：{}", engine.display_name(), query)
        }
        RouteOutcome::CommandExecuted { command, score } => {
            format!("最相似（{}%）：{} 执行", percent(*score), command.name)
        }
        RouteOutcome::NoMatch {
            best_score,
            best_command: Some(command),
        } => format!("最相似（{}%）：{} 不执行", percent(*best_score), command.name),
        RouteOutcome::NoMatch {
            best_command: None, ..
        } => "未匹配到快捷指令 不执行".to_string(),
    }
}

fn percent(score: f32) -> i64 {
    (f64::from(score) * 100.0).round() as i64
}

/// 组合根：一次只处理一句话
///
/// `reason` 永远返回文字，失败时降级为不执行，错误通过诊断通道交给宿主。
pub struct ComputerExecutor {
    catalog: CommandCatalog,
    router: IntentRouter,
    post_processor: TextPostProcessor,
    store: Arc<dyn CommandStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn ActionBackend>,
    text_config: Mutex<TextAutoProcessConfig>,
    diagnostics: DiagnosticSender,
}

impl ComputerExecutor {
    pub fn new(
        router: IntentRouter,
        text_config: TextAutoProcessConfig,
        store: Arc<dyn CommandStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        backend: Arc<dyn ActionBackend>,
        diagnostics: DiagnosticSender,
    ) -> Self {
        Self {
            catalog: CommandCatalog::new(),
            router,
            post_processor: TextPostProcessor,
            store,
            embedder,
            backend,
            text_config: Mutex::new(text_config),
            diagnostics,
        }
    }

    /// 按配置文件组装
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn CommandStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        backend: Arc<dyn ActionBackend>,
        diagnostics: DiagnosticSender,
    ) -> Self {
        let router = IntentRouter::new(
            SearchPrefixMatcher::new(config.router.default_search_engine),
            config.router.similarity_threshold,
        );
        Self::new(
            router,
            config.text_auto_process,
            store,
            embedder,
            backend,
            diagnostics,
        )
    }

    /// 从存储读取指令并建立索引
    ///
    /// 失败时目录保持未就绪，之后的 `reason` 一律不执行。
    pub async fn init(&self) -> Result<(), Diagnostic> {
        let commands = self.store.load()?;
        self.catalog.load(commands);
        self.catalog.rebuild_index(self.embedder.as_ref()).await?;
        Ok(())
    }

    /// 用户编辑指令列表后保存并重建索引
    pub async fn update_commands(&self, commands: Vec<Command>) -> Result<(), Diagnostic> {
        self.store.save(&commands)?;
        self.catalog.load(commands);
        self.catalog.rebuild_index(self.embedder.as_ref()).await?;
        Ok(())
    }

    /// 重试建立索引（上次失败后由宿主调用）
    pub async fn rebuild_index(&self) -> Result<(), Diagnostic> {
        Ok(self.catalog.rebuild_index(self.embedder.as_ref()).await?)
    }

    pub fn is_ready(&self) -> bool {
        self.catalog.is_ready()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.catalog.commands()
    }

    pub fn text_config(&self) -> TextAutoProcessConfig {
        *self.text_config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_text_config(&self, config: TextAutoProcessConfig) {
        log::info!("文本处理设置已更新: {config:?}");
        *self.text_config.lock().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// 判断需求并执行，返回给界面显示的文字
    pub async fn reason(&self, text: &str) -> String {
        let outcome = self
            .router
            .route(
                text,
                &self.catalog,
                self.embedder.as_ref(),
                self.backend.as_ref(),
                &self.diagnostics,
            )
            .await;

        if outcome != RouteOutcome::EmptyInput {
            let config = self.text_config();
            if let Err(e) = self
                .post_processor
                .apply(text, &config, self.backend.as_ref())
                .await
            {
                report(&self.diagnostics, e);
            }
        }

        format_outcome(&outcome)
    }
}
