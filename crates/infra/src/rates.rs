//! Historical exchange rates from a Frankfurter-compatible HTTP service.
//!
//! Lookups block until the service answers: no timeout, no retry.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use invoicer_accounting::{ConversionError, RateProvider};
use invoicer_core::CurrencyCode;

pub const DEFAULT_RATES_URL: &str = "https://api.frankfurter.app";

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: BTreeMap<String, Decimal>,
}

/// `GET {base_url}/{YYYY-MM-DD}?from={base}&to={target}`.
#[derive(Debug, Clone)]
pub struct FrankfurterRates {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl FrankfurterRates {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConversionError> {
        let client = reqwest::blocking::Client::builder()
            // the blocking client otherwise gives up after 30 s
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ConversionError::RateServiceUnavailable(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RateProvider for FrankfurterRates {
    fn rates(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        on: NaiveDate,
    ) -> Result<BTreeMap<CurrencyCode, Decimal>, ConversionError> {
        let url = format!("{}/{}", self.base_url, on.format("%Y-%m-%d"));
        tracing::debug!(%url, %base, %target, "fetching exchange rates");

        let response = self
            .client
            .get(&url)
            .query(&[("from", base.as_str()), ("to", target.as_str())])
            .send()
            .map_err(|e| ConversionError::RateServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "rate service rejected request");
            return Err(ConversionError::RateServiceUnavailable(format!(
                "{url} answered {status}"
            )));
        }

        let body: RatesResponse = response
            .json()
            .map_err(|e| ConversionError::RateServiceUnavailable(e.to_string()))?;
        Ok(parse_rates(body))
    }
}

fn parse_rates(body: RatesResponse) -> BTreeMap<CurrencyCode, Decimal> {
    body.rates
        .into_iter()
        .filter_map(|(code, rate)| match code.parse::<CurrencyCode>() {
            Ok(code) => Some((code, rate)),
            Err(_) => {
                tracing::warn!(%code, "ignoring malformed currency code from rate service");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::str::FromStr;
    use std::thread;

    /// Answers a single request with `status` and `body`, handing back the
    /// request line it saw.
    fn one_shot_server(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        delayed_server(Duration::ZERO, status, body)
    }

    /// Like [`one_shot_server`], but waits `delay` after reading the request.
    fn delayed_server(
        delay: Duration,
        status: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            thread::sleep(delay);
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            request_line
        });
        (format!("http://{addr}"), handle)
    }

    fn usd() -> CurrencyCode {
        CurrencyCode::from_str("USD").unwrap()
    }

    fn eur() -> CurrencyCode {
        CurrencyCode::from_str("EUR").unwrap()
    }

    #[test]
    fn parses_rates_and_skips_malformed_codes() {
        let body: RatesResponse =
            serde_json::from_str(r#"{"amount":1.0,"base":"USD","date":"2023-01-10","rates":{"EUR":0.9,"bogus":1.5}}"#)
                .unwrap();

        let rates = parse_rates(body);

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[&eur()], Decimal::new(9, 1));
    }

    #[test]
    fn requests_the_dated_endpoint() {
        let (url, server) = one_shot_server("200 OK", r#"{"rates":{"EUR":0.9}}"#);
        let provider = FrankfurterRates::new(format!("{url}/")).unwrap();

        let rates = provider
            .rates(&usd(), &eur(), NaiveDate::from_ymd_opt(2023, 1, 10).unwrap())
            .unwrap();

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /2023-01-10?from=USD&to=EUR "));
        assert_eq!(rates[&eur()], Decimal::new(9, 1));
    }

    #[test]
    fn non_success_status_is_unavailable() {
        let (url, server) = one_shot_server("500 Internal Server Error", "{}");
        let provider = FrankfurterRates::new(url).unwrap();

        let err = provider
            .rates(&usd(), &eur(), NaiveDate::from_ymd_opt(2023, 1, 10).unwrap())
            .unwrap_err();

        server.join().unwrap();
        assert!(matches!(err, ConversionError::RateServiceUnavailable(_)));
    }

    #[test]
    fn slow_service_is_waited_for() {
        let (url, server) = delayed_server(
            Duration::from_secs(2),
            "200 OK",
            r#"{"rates":{"EUR":0.93}}"#,
        );
        let provider = FrankfurterRates::new(url).unwrap();

        let rates = provider
            .rates(&usd(), &eur(), NaiveDate::from_ymd_opt(2023, 1, 10).unwrap())
            .unwrap();

        server.join().unwrap();
        assert_eq!(rates[&eur()], Decimal::new(93, 2));
    }
}
