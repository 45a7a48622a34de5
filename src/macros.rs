//! 宏集合：用数组字面量的写法书写条件树。
//!
//! ```
//! use halo_transfer::{bind, tree};
//!
//! let t = tree!(["and", ["=", "n.id", bind(5)], ["in", "n.status", [1, 2]], "deleted" => 0]);
//! # let _ = t;
//! ```
//!
//! - `[...]` 是数组，元素之间用逗号分隔，可以嵌套；
//! - `"key" => value` 是带键元素，键必须是字面量；
//! - 其它元素经 `Node::from` 转换，复杂表达式请加括号。

#[macro_export]
macro_rules! tree {
    (@arr [$($out:expr,)*]) => {
        $crate::condition::Node::Array(vec![$($out,)*])
    };
    (@arr [$($out:expr,)*] $key:literal => [$($inner:tt)*] $(, $($rest:tt)*)?) => {
        $crate::tree!(@arr [$($out,)* $crate::condition::Entry::keyed($key, $crate::tree!([$($inner)*])),] $($($rest)*)?)
    };
    (@arr [$($out:expr,)*] $key:literal => $value:expr $(, $($rest:tt)*)?) => {
        $crate::tree!(@arr [$($out,)* $crate::condition::Entry::keyed($key, $crate::condition::Node::from($value)),] $($($rest)*)?)
    };
    (@arr [$($out:expr,)*] [$($inner:tt)*] $(, $($rest:tt)*)?) => {
        $crate::tree!(@arr [$($out,)* $crate::condition::Entry::positional($crate::tree!([$($inner)*])),] $($($rest)*)?)
    };
    (@arr [$($out:expr,)*] $value:expr $(, $($rest:tt)*)?) => {
        $crate::tree!(@arr [$($out,)* $crate::condition::Entry::positional($crate::condition::Node::from($value)),] $($($rest)*)?)
    };
    ([$($body:tt)*]) => {
        $crate::tree!(@arr [] $($body)*)
    };
    ($value:expr) => {
        $crate::condition::Node::from($value)
    };
}
