//! 查询向量与指令向量矩阵的相似度排序。
//!
//! 相似度就是点积。向量化服务保证输出单位向量，所以点积即余弦相似度；
//! 这里不做归一化，阈值的含义依赖于服务方的这一约定。

use crate::catalog::IndexedCatalog;

/// 单条匹配结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    /// 在目录中的行号
    pub index: usize,
    pub score: f32,
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// 按相似度降序排列所有指令，分数相同时行号小的在前
pub fn query(vector: &[f32], catalog: &IndexedCatalog) -> Vec<Scored> {
    let mut scored: Vec<Scored> = (0..catalog.len())
        .map(|index| Scored {
            index,
            score: dot(vector, catalog.row(index)),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.index.cmp(&b.index))
    });
    scored
}

/// 取前 k 个；k 为 0 返回空，超过目录大小时返回全部
pub fn top_k(vector: &[f32], catalog: &IndexedCatalog, k: usize) -> Vec<Scored> {
    let mut scored = query(vector, catalog);
    scored.truncate(k.min(catalog.len()));
    scored
}
