use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::command::{Command, CommandKind};
use crate::embedding::{validate_vector, EmbeddingProvider};
use crate::error::{ProviderError, RebuildError};

/// 已建立索引的快捷指令快照
///
/// 按行对齐保存：第 i 行的名称、类型、内容和向量都属于同一条指令。
/// 快照构造后不可变，重建索引时整体替换。
#[derive(Debug, Clone, Default)]
pub struct IndexedCatalog {
    names: Vec<String>,
    kinds: Vec<CommandKind>,
    values: Vec<String>,
    /// N × dim，按行展开
    matrix: Vec<f32>,
    dim: usize,
}

impl IndexedCatalog {
    fn from_commands(commands: &[Command]) -> Result<Self, RebuildError> {
        let mut catalog = IndexedCatalog::default();
        for command in commands {
            let embedding = command.embedding.as_deref().unwrap_or_default();
            if catalog.names.is_empty() {
                catalog.dim = embedding.len();
            } else if embedding.len() != catalog.dim {
                return Err(RebuildError::DimensionMismatch {
                    command: command.name.clone(),
                    expected: catalog.dim,
                    actual: embedding.len(),
                });
            }
            catalog.names.push(command.name.clone());
            catalog.kinds.push(command.kind);
            catalog.values.push(command.value.clone());
            catalog.matrix.extend_from_slice(embedding);
        }
        Ok(catalog)
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 向量维度，空目录为 0
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// 矩阵行数，始终等于 `names_in_order().len()`
    pub fn rows(&self) -> usize {
        if self.dim == 0 {
            self.names.len()
        } else {
            self.matrix.len() / self.dim
        }
    }

    pub fn names_in_order(&self) -> &[String] {
        &self.names
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.matrix[index * self.dim..(index + 1) * self.dim]
    }

    /// 还原第 index 行的指令（带向量）
    pub fn command(&self, index: usize) -> Option<Command> {
        if index >= self.len() {
            return None;
        }
        Some(Command {
            name: self.names[index].clone(),
            kind: self.kinds[index],
            value: self.values[index].clone(),
            embedding: Some(self.row(index).to_vec()),
        })
    }
}

#[derive(Debug, Default)]
struct Loaded {
    commands: Vec<Command>,
    /// 每次 load 递增，用于识别过期的重建结果
    generation: u64,
}

/// 快捷指令目录
///
/// `load` 整体替换指令列表并使索引失效，`rebuild_index` 成功后原子地换入新快照。
/// 路由只通过 `snapshot()` 读取，拿到的要么是完整的旧索引，要么是完整的新索引。
#[derive(Debug, Default)]
pub struct CommandCatalog {
    loaded: Mutex<Loaded>,
    index: RwLock<Option<Arc<IndexedCatalog>>>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换全部指令，向量清空，索引标记为未就绪
    pub fn load(&self, commands: Vec<Command>) {
        let commands = commands
            .into_iter()
            .map(|c| Command { embedding: None, ..c })
            .collect::<Vec<_>>();
        log::info!("加载快捷指令 {} 条", commands.len());

        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        loaded.commands = commands;
        loaded.generation += 1;
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// 为缺少向量的指令计算向量，全部成功后换入新索引
    ///
    /// 任意一条失败则整体失败，目录保持调用前的状态。
    pub async fn rebuild_index(&self, embedder: &dyn EmbeddingProvider) -> Result<(), RebuildError> {
        let (mut commands, generation) = {
            let loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
            (loaded.commands.clone(), loaded.generation)
        };

        for command in commands.iter_mut().filter(|c| c.embedding.is_none()) {
            let vector = embedder
                .embed(&command.name)
                .await
                .and_then(|v| validate_vector(&v).map(|_| v))
                .map_err(|source| RebuildError::Embedding {
                    command: command.name.clone(),
                    source,
                })?;
            command.embedding = Some(vector);
        }

        let indexed = Arc::new(IndexedCatalog::from_commands(&commands)?);

        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if loaded.generation != generation {
            log::warn!("重建索引期间指令列表已变化，丢弃本次结果");
            return Err(RebuildError::Superseded);
        }
        loaded.commands = commands;
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = Some(indexed);
        log::info!("快捷指令索引重建完成: {} 条", loaded.commands.len());
        Ok(())
    }

    /// 上次 load 之后是否成功重建过索引
    pub fn is_ready(&self) -> bool {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// 按加载顺序返回指令名称
    pub fn names_in_order(&self) -> Vec<String> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .commands
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// 当前指令列表（已建立索引时带向量）
    pub fn commands(&self) -> Vec<Command> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .commands
            .clone()
    }

    /// 当前可用的索引快照，未就绪时为 None
    pub fn snapshot(&self) -> Option<Arc<IndexedCatalog>> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// 检查查询向量与索引维度一致
pub fn check_query_dim(catalog: &IndexedCatalog, query: &[f32]) -> Result<(), ProviderError> {
    if !catalog.is_empty() && catalog.dim() != query.len() {
        return Err(ProviderError::DimensionMismatch {
            expected: catalog.dim(),
            actual: query.len(),
        });
    }
    Ok(())
}
