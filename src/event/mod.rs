/// 抓取報價、存檔並繪圖
pub mod stock_quote;
