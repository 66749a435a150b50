#![allow(dead_code)]

use epex_imbalance::config::Config;

/// Market-data page with the given labels and price cells
pub fn market_page<L: AsRef<str>, P: AsRef<str>>(labels: &[L], prices: &[P]) -> String {
    let items: String = labels
        .iter()
        .map(|l| format!("<li>{}</li>", l.as_ref()))
        .collect();
    let rows: String = prices
        .iter()
        .map(|p| {
            format!(
                "<tr><td>1,0</td><td>2,0</td><td>3,0</td><td>{}</td></tr>",
                p.as_ref()
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html><body>
        <div class="js-md-widget">
          <div class="fixed-column js-table-times"><ul>{items}</ul></div>
          <table class="table-01 table-length-1">
            <thead><tr><th>Buy Volume</th><th>Sell Volume</th><th>Volume</th><th>Price</th></tr></thead>
            <tbody>
              <tr><td>MWh</td><td>MWh</td><td>MWh</td><td>€/MWh</td></tr>
              <tr class="sub"><td colspan="4"></td></tr>
              {rows}
            </tbody>
          </table>
        </div></body></html>"#
    )
}

/// All 96 quarter-hour windows of a day at one price
pub fn full_day_page(price: &str) -> String {
    let labels: Vec<String> = (0..96)
        .map(|i| {
            let start = i * 15;
            let end = (start + 15) % 1440;
            format!(
                "{:02}:{:02} - {:02}:{:02}",
                start / 60,
                start % 60,
                end / 60,
                end % 60
            )
        })
        .collect();
    let prices = vec![price.to_string(); labels.len()];
    market_page(&labels, &prices)
}

/// Default configuration pointed at a mock server
pub fn config_for(server_url: &str) -> Config {
    let mut config = Config::default();
    config.imbalance.base_url = format!("{server_url}/api/explore/v2.1/catalog/datasets");
    config.auction.market_url = format!("{server_url}/en/market-data");
    config.http.timeout_seconds = 2;
    config
}

pub const IMBALANCE_PATH: &str = "/api/explore/v2.1/catalog/datasets/ods161/records";
pub const MARKET_PATH: &str = "/en/market-data";

/// Local endpoint that accepts connections and never answers
///
/// Returns the base URL; accepted sockets are held open until the test ends.
pub async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}
