use rand::Rng;

// Only desktop browsers: the quote page serves different markup to mobile
// agents and the configured selectors target the desktop layout.

const CHROME_VERSIONS: [&str; 12] = [
    "133.0.6943.88", "133.0.6943.60", "132.0.6834.110", "132.0.6834.83",
    "131.0.6778.108", "131.0.6778.85", "130.0.6723.117", "130.0.6723.92",
    "129.0.6668.89", "129.0.6668.70", "128.0.6613.138", "128.0.6613.120",
];

const FIREFOX_VERSIONS: [&str; 8] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0",
];

const EDGE_VERSIONS: [&str; 6] = [
    "133.0.3048.56", "133.0.3048.46", "132.0.2957.63", "132.0.2957.55",
    "131.0.2903.112", "131.0.2903.86",
];

const DESKTOP_OS: [&str; 8] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 11.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 14_7_2",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
    "X11; CrOS x86_64 15823.14.0",
];

fn pick<'a>(items: &[&'a str]) -> &'a str {
    items[rand::rng().random_range(0..items.len())]
}

fn gen_chrome_ua() -> String {
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        pick(&DESKTOP_OS),
        pick(&CHROME_VERSIONS)
    )
}

fn gen_firefox_ua() -> String {
    let version = pick(&FIREFOX_VERSIONS);
    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        pick(&DESKTOP_OS),
        version,
        version
    )
}

fn gen_edge_ua() -> String {
    let version = pick(&EDGE_VERSIONS);
    let chrome_major = version.split('.').next().unwrap_or("133");
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 Edg/{}",
        pick(&DESKTOP_OS[..4]),
        chrome_major,
        version
    )
}

pub fn gen_random_ua() -> String {
    match rand::rng().random_range(0..10) {
        0..=5 => gen_chrome_ua(),  // 60% Chrome
        6..=7 => gen_firefox_ua(), // 20% Firefox
        _ => gen_edge_ua(),        // 20% Edge
    }
}
