//! 定义了整个库通用的、与具体提供商无关的核心数据模型。

pub mod relation;
pub mod track;
