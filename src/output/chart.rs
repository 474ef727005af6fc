use std::{cmp::Ordering, fs, path::Path};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use plotters::{
    prelude::*,
    style::{
        register_font,
        FontStyle,
        text_anchor::{HPos, Pos, VPos},
    },
};

use crate::{config, declare::StockQuote};

/// 每根長條的寬度（point），實際像素依 dpi 換算
const BAR_WIDTH_PT: f64 = 20.0;
const FONT_FAMILY: &str = "sans-serif";
/// 未指定字型時依序嘗試
const FONT_CANDIDATES: [&str; 7] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];
static FONT: OnceCell<String> = OnceCell::new();

/// Sorts ascending by numeric price. Unparseable prices count as zero and
/// equal prices keep their collection order.
pub fn sort_by_price(quotes: &mut [StockQuote]) {
    quotes.sort_by(|a, b| {
        a.price_value()
            .partial_cmp(&b.price_value())
            .unwrap_or(Ordering::Equal)
    });
}

/// Bar label text, e.g. `$12.34`.
pub fn price_label(price: f64) -> String {
    format!("${:.2}", price)
}

fn has_price(quote: &StockQuote) -> bool {
    quote
        .price
        .parse::<f64>()
        .map(f64::is_finite)
        .unwrap_or(false)
}

/// What ends up on the chart, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Bars {
    pub names: Vec<String>,
    pub prices: Vec<f64>,
    /// 長條上方的價格標籤
    pub labels: Vec<String>,
}

/// Sorts `quotes` by price and lays them out as bars.
///
/// Fails when no quote carries a parseable price.
pub fn bars(quotes: &mut [StockQuote]) -> Result<Bars> {
    sort_by_price(quotes);

    if !quotes.iter().any(has_price) {
        return Err(anyhow!("No valid data for the graph"));
    }

    let prices: Vec<f64> = quotes.iter().map(StockQuote::price_value).collect();
    Ok(Bars {
        names: quotes.iter().map(|q| q.company.clone()).collect(),
        labels: prices.iter().copied().map(price_label).collect(),
        prices,
    })
}

/// 依價格由低到高排序後繪製長條圖並存成 PNG
///
/// `quotes` is reordered in place. Fails when no quote carries a parseable
/// price, when no font can be loaded, or when any drawing step or the final
/// save fails. Returns the number of bars drawn.
pub fn render(quotes: &mut [StockQuote], path: &Path, chart: &config::Chart) -> Result<usize> {
    let laid_out = bars(quotes)?;

    load_font(&chart.font_path)?;
    draw(path, chart, &laid_out)?;

    Ok(laid_out.prices.len())
}

/// Font file used for chart text: `font_path` when set, otherwise the first
/// common system font that exists.
pub fn find_font(font_path: &str) -> Result<&str> {
    if !font_path.is_empty() {
        return if Path::new(font_path).is_file() {
            Ok(font_path)
        } else {
            Err(anyhow!("Font {} does not exist", font_path))
        };
    }

    FONT_CANDIDATES
        .into_iter()
        .find(|p| Path::new(p).is_file())
        .ok_or_else(|| anyhow!("No font found for the graph, set chart.font_path"))
}

/// 註冊繪圖用的字型，整個程序只需一次
fn load_font(font_path: &str) -> Result<()> {
    FONT.get_or_try_init(|| {
        let path = find_font(font_path)?;
        let bytes = fs::read(path).with_context(|| format!("Failed to read font {}", path))?;

        // plotters 需要 'static 的字型資料，只會註冊一次
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        register_font(FONT_FAMILY, FontStyle::Normal, bytes)
            .map_err(|_| anyhow!("Failed to load font {}, not a valid TTF/OTF file", path))?;

        Ok::<String, anyhow::Error>(path.to_string())
    })?;

    Ok(())
}

fn draw(path: &Path, setting: &config::Chart, bars: &Bars) -> Result<()> {
    let (names, prices) = (&bars.names, &bars.prices);
    let root = BitMapBackend::new(path, setting.size()).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|why| anyhow!("Failed to create plot because {:?}", why))?;

    // 第 i 根長條置中於 x = i
    let count = prices.len().max(1);
    let x_range = -0.5..(count as f64 - 0.5);
    let top = prices.iter().copied().fold(0.0_f64, f64::max);
    let bottom = prices.iter().copied().fold(0.0_f64, f64::min);
    let y_max = if top > 0.0 { top * 1.15 } else { 1.0 };

    let mut ctx = ChartBuilder::on(&root)
        .caption(&setting.title, (FONT_FAMILY, 28).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, bottom..y_max)
        .map_err(|why| anyhow!("Failed to create plot because {:?}", why))?;

    let x_formatter = |v: &f64| company_at(names, *v);

    ctx.configure_mesh()
        .x_desc(&setting.x_desc)
        .y_desc(&setting.y_desc)
        .x_labels(count + 1)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()
        .map_err(|why| anyhow!("Failed to draw chart axes because {:?}", why))?;

    // 長條固定寬度，換算成 x 軸單位
    let (plot_width, _) = ctx.plotting_area().dim_in_pixel();
    let bar_px = BAR_WIDTH_PT / 72.0 * setting.dpi;
    let half = (bar_px / f64::from(plot_width.max(1)) * count as f64 / 2.0).min(0.45);
    let bar_style = Palette99::pick(2).filled();

    ctx.draw_series(prices.iter().enumerate().map(|(i, p)| {
        let x = i as f64;
        Rectangle::new([(x - half, 0.0), (x + half, *p)], bar_style)
    }))
    .map_err(|why| anyhow!("Failed to create bar chart because {:?}", why))?;

    let label_style = TextStyle::from((FONT_FAMILY, 14).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    ctx.draw_series(prices.iter().zip(&bars.labels).enumerate().map(|(i, (p, label))| {
        Text::new(label.clone(), (i as f64, *p), label_style.clone())
    }))
    .map_err(|why| anyhow!("Failed to create bar labels because {:?}", why))?;

    root.present()
        .map_err(|why| anyhow!("Failed to save graph because {:?}", why))?;

    Ok(())
}

/// X 軸刻度只在整數位置顯示公司名稱
fn company_at(names: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }

    names.get(index as usize).cloned().unwrap_or_default()
}
