use serde::{Deserialize, Serialize};

/// 支持的搜索引擎
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEngine {
    #[default]
    Bing,
    Google,
    Zhihu,
    Bilibili,
    Xiaohongshu,
}

impl SearchEngine {
    /// 具名搜索的优先顺序
    pub const ALL: [SearchEngine; 5] = [
        SearchEngine::Bing,
        SearchEngine::Google,
        SearchEngine::Zhihu,
        SearchEngine::Bilibili,
        SearchEngine::Xiaohongshu,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SearchEngine::Bing => "必应",
            SearchEngine::Google => "谷歌",
            SearchEngine::Zhihu => "知乎",
            SearchEngine::Bilibili => "哔哩哔哩",
            SearchEngine::Xiaohongshu => "小红书",
        }
    }

    /// 搜索地址模板，`{}` 处替换为关键词
    pub fn url_template(self) -> &'static str {
        match self {
            SearchEngine::Bing => "https://cn.bing.com/search?q={}",
            SearchEngine::Google => "https://www.google.com/search?q={}",
            SearchEngine::Zhihu => "https://www.zhihu.com/search?q={}&type=content",
            SearchEngine::Bilibili => "https://search.bilibili.com/all?keyword={}",
            SearchEngine::Xiaohongshu => "https://www.xiaohongshu.com/search_result/?keyword={}",
        }
    }

    /// 生成搜索地址，关键词做 URL 编码
    pub fn search_url(self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.url_template().replacen("{}", &encoded, 1)
    }
}

/// 搜索前缀，如 "知乎搜索"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEngineAlias {
    pub display_prefix: String,
    pub engine: SearchEngine,
}

/// 前缀匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub engine: SearchEngine,
    pub query: String,
}

/// "xx搜索关键词" 形式的前缀匹配
///
/// 具名引擎在前，裸 "搜索" 最后，按顺序返回第一个命中的前缀。调整顺序会改变行为。
#[derive(Debug, Clone)]
pub struct SearchPrefixMatcher {
    aliases: Vec<SearchEngineAlias>,
}

impl SearchPrefixMatcher {
    pub fn new(default_engine: SearchEngine) -> Self {
        let mut aliases: Vec<SearchEngineAlias> = SearchEngine::ALL
            .iter()
            .map(|&engine| SearchEngineAlias {
                display_prefix: format!("{}搜索", engine.display_name()),
                engine,
            })
            .collect();
        aliases.push(SearchEngineAlias {
            display_prefix: "搜索".to_string(),
            engine: default_engine,
        });
        Self { aliases }
    }

    pub fn aliases(&self) -> &[SearchEngineAlias] {
        &self.aliases
    }

    pub fn match_text(&self, text: &str) -> Option<SearchMatch> {
        self.aliases.iter().find_map(|alias| {
            text.strip_prefix(alias.display_prefix.as_str())
                .map(|rest| SearchMatch {
                    engine: alias.engine,
                    query: rest.to_string(),
                })
        })
    }
}

impl Default for SearchPrefixMatcher {
    fn default() -> Self {
        Self::new(SearchEngine::default())
    }
}
