//! 投票模块：提名列表与一人一票投票接口。

pub(crate) mod handler;
