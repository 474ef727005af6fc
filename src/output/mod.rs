/// 長條圖
pub mod chart;
/// CSV 檔
pub mod table;
