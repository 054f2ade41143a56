use crate::backend::{execute_command, ActionBackend};
use crate::catalog::{check_query_dim, CommandCatalog};
use crate::command::Command;
use crate::embedding::{validate_vector, EmbeddingProvider};
use crate::error::{report, DiagnosticSender};
use crate::search::{SearchEngine, SearchPrefixMatcher};
use crate::similarity;

/// 默认相似度阈值
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// 路由决策
///
/// 表示决定做什么，不代表动作实际执行成功；执行失败走诊断通道。
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    SearchExecuted {
        engine: SearchEngine,
        query: String,
    },
    CommandExecuted {
        command: Command,
        score: f32,
    },
    /// 分数未超过阈值；仍带上最接近的指令。索引未就绪或向量化失败时分数为负无穷
    NoMatch {
        best_score: f32,
        best_command: Option<Command>,
    },
    EmptyInput,
}

impl RouteOutcome {
    fn unavailable() -> Self {
        RouteOutcome::NoMatch {
            best_score: f32::NEG_INFINITY,
            best_command: None,
        }
    }
}

/// 意图路由：空输入检查 → 搜索前缀 → 语义相似度 → 阈值判定
#[derive(Debug, Clone)]
pub struct IntentRouter {
    matcher: SearchPrefixMatcher,
    threshold: f32,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new(SearchPrefixMatcher::default(), DEFAULT_THRESHOLD)
    }
}

impl IntentRouter {
    pub fn new(matcher: SearchPrefixMatcher, threshold: f32) -> Self {
        Self { matcher, threshold }
    }

    /// 严格大于阈值才执行
    pub fn fires(&self, score: f32) -> bool {
        score > self.threshold
    }

    pub async fn route(
        &self,
        text: &str,
        catalog: &CommandCatalog,
        embedder: &dyn EmbeddingProvider,
        backend: &dyn ActionBackend,
        diagnostics: &DiagnosticSender,
    ) -> RouteOutcome {
        let text = text.trim();
        if text.is_empty() {
            log::info!("空字符串 不处理");
            return RouteOutcome::EmptyInput;
        }

        if let Some(found) = self.matcher.match_text(text) {
            let url = found.engine.search_url(&found.query);
            log::info!("{}搜索: {}", found.engine.display_name(), found.query);
            if let Err(e) = backend.open_url(&url).await {
                report(diagnostics, e);
            }
            return RouteOutcome::SearchExecuted {
                engine: found.engine,
                query: found.query,
            };
        }

        // 只读取一次快照，期间的重建不会影响本次查询
        let Some(index) = catalog.snapshot() else {
            // 启动时已经报告过，这里只降级
            log::warn!("快捷指令索引未就绪 不执行");
            return RouteOutcome::unavailable();
        };
        if index.is_empty() {
            log::info!("没有快捷指令 不执行");
            return RouteOutcome::unavailable();
        }

        let vector = match embedder
            .embed(text)
            .await
            .and_then(|v| validate_vector(&v).map(|_| v))
            .and_then(|v| check_query_dim(&index, &v).map(|_| v))
        {
            Ok(v) => v,
            Err(e) => {
                report(diagnostics, e);
                return RouteOutcome::unavailable();
            }
        };

        let Some(best) = similarity::top_k(&vector, &index, 1).into_iter().next() else {
            return RouteOutcome::unavailable();
        };
        let command = index.command(best.index);
        log::info!(
            "最相似的操作是：{}，相似度：{}",
            index.names_in_order()[best.index],
            best.score
        );

        match command {
            Some(command) if self.fires(best.score) => {
                if let Err(e) = execute_command(backend, &command).await {
                    report(diagnostics, e);
                }
                RouteOutcome::CommandExecuted {
                    command,
                    score: best.score,
                }
            }
            command => {
                log::info!("未匹配");
                RouteOutcome::NoMatch {
                    best_score: best.score,
                    best_command: command,
                }
            }
        }
    }
}
