use thiserror::Error;

/// 启动期配置错误，出现后路由降级为始终不匹配
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("读写配置失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("解析配置失败: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("序列化配置失败: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("未设置 embedding API key")]
    MissingApiKey,

    #[error("API key 无效: {0}")]
    InvalidApiKey(ProviderError),

    #[error("快捷指令索引未就绪: {0}")]
    CatalogNotReady(String),
}

/// 向量化服务错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("空字符串不能向量化")]
    EmptyInput,

    #[error("未设置 API key")]
    MissingApiKey,

    #[error("请求失败: {0}")]
    Request(String),

    #[error("返回错误状态: {0}")]
    Status(u16),

    #[error("解析响应失败: {0}")]
    Decode(String),

    #[error("返回了空向量")]
    EmptyVector,

    #[error("向量包含非有限值")]
    NonFinite,

    #[error("向量维度不一致: 期望 {expected}，实际 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// 执行动作失败（打开网页、启动程序、键盘、剪贴板）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("启动 {target} 失败: {reason}")]
    Spawn { target: String, reason: String },

    #[error("{target} 退出码异常: {code:?}")]
    ExitStatus { target: String, code: Option<i32> },

    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    #[error("键盘操作失败: {0}")]
    Keyboard(String),

    #[error("无效的指令内容: {0}")]
    InvalidValue(String),
}

/// 重建索引失败，目录保持原状态
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RebuildError {
    #[error("快捷指令 \"{command}\" 向量化失败: {source}")]
    Embedding {
        command: String,
        #[source]
        source: ProviderError,
    },

    #[error("快捷指令 \"{command}\" 向量维度 {actual} 与 {expected} 不一致")]
    DimensionMismatch {
        command: String,
        expected: usize,
        actual: usize,
    },

    #[error("重建期间指令列表已被替换")]
    Superseded,
}

/// 快捷指令存储错误
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("读写快捷指令文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("快捷指令文件格式错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 旁路诊断信息，交给宿主展示，不影响路由结果
#[derive(Error, Debug)]
pub enum Diagnostic {
    #[error("配置错误: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("向量化错误: {0}")]
    Provider(#[from] ProviderError),

    #[error("执行错误: {0}")]
    Action(#[from] ActionError),

    #[error("索引错误: {0}")]
    Rebuild(#[from] RebuildError),

    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
}

/// 诊断信息发送端
pub type DiagnosticSender = tokio::sync::mpsc::UnboundedSender<Diagnostic>;

/// 记录日志并发送诊断；接收端关闭时忽略
pub(crate) fn report(tx: &DiagnosticSender, diagnostic: impl Into<Diagnostic>) {
    let diagnostic = diagnostic.into();
    log::error!("{diagnostic}");
    let _ = tx.send(diagnostic);
}
