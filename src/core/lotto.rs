use crate::domain::model::{
    DrawResult, MatchReport, PrizeRank, Ticket, LOTTO_MAX, LOTTO_PICK,
};
use crate::domain::ports::DrawSource;
use crate::utils::error::{LabError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use rand::Rng;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str =
    "https://www.dhlottery.co.kr/common.do?method=getLottoNumber&drwNo={round}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LottoSettings {
    /// `{round}` is replaced with the draw number.
    pub endpoint: String,
    pub max_sets: usize,
    pub timeout_seconds: u64,
}

impl Default for LottoSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_sets: 50,
            timeout_seconds: 10,
        }
    }
}

/// `count` tickets, each six distinct numbers from 1..=45.
pub fn generate_tickets<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Result<Vec<Ticket>> {
    (0..count)
        .map(|_| {
            let numbers: Vec<u8> =
                rand::seq::index::sample(&mut *rng, LOTTO_MAX as usize, LOTTO_PICK)
                    .into_iter()
                    .map(|i| i as u8 + 1)
                    .collect();
            Ticket::new(&numbers)
        })
        .collect()
}

pub fn compare(ticket: &Ticket, draw: &DrawResult) -> MatchReport {
    let matched: Vec<u8> = ticket
        .numbers()
        .iter()
        .copied()
        .filter(|n| draw.winning.contains(*n))
        .collect();
    let bonus_matched = ticket.contains(draw.bonus);
    let rank = match (matched.len(), bonus_matched) {
        (6, _) => Some(PrizeRank::First),
        (5, true) => Some(PrizeRank::Second),
        (5, false) => Some(PrizeRank::Third),
        (4, _) => Some(PrizeRank::Fourth),
        (3, _) => Some(PrizeRank::Fifth),
        _ => None,
    };

    MatchReport {
        ticket: ticket.clone(),
        matched,
        bonus_matched,
        rank,
    }
}

fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Round 1 was drawn on 2002-12-07 at 20:45 KST; one draw per week since.
pub fn estimate_latest_round(now: DateTime<FixedOffset>) -> u32 {
    let first_draw = NaiveDate::from_ymd_opt(2002, 12, 7)
        .and_then(|d| d.and_hms_opt(20, 45, 0))
        .and_then(|dt| kst().from_local_datetime(&dt).single());
    let Some(first_draw) = first_draw else {
        return 1;
    };

    let elapsed = now.signed_duration_since(first_draw);
    if elapsed < Duration::zero() {
        return 1;
    }
    (elapsed.num_weeks() + 1) as u32
}

/// Pulls the winning numbers out of a results response body.
///
/// The body is scanned with patterns rather than decoded, so extra or
/// reordered fields do not matter.
pub fn parse_draw_response(body: &str) -> Result<DrawResult> {
    let pattern = |p: &str| {
        Regex::new(p).map_err(|e| LabError::DrawParseError {
            message: e.to_string(),
        })
    };

    if pattern(r#""returnValue"\s*:\s*"fail""#)?.is_match(body) {
        return Err(LabError::DrawParseError {
            message: "the results source reported no draw for this round".to_string(),
        });
    }

    let mut numbers = [None; LOTTO_PICK];
    for caps in pattern(r#""drwtNo([1-6])"\s*:\s*(\d+)"#)?.captures_iter(body) {
        let slot: usize = caps[1].parse().unwrap_or(0);
        let value: u8 = caps[2].parse().map_err(|_| LabError::DrawParseError {
            message: format!("winning number '{}' is out of range", &caps[2]),
        })?;
        if (1..=LOTTO_PICK).contains(&slot) {
            numbers[slot - 1] = Some(value);
        }
    }
    let numbers: Vec<u8> = numbers
        .iter()
        .enumerate()
        .map(|(i, n)| {
            n.ok_or_else(|| LabError::DrawParseError {
                message: format!("winning number {} is missing", i + 1),
            })
        })
        .collect::<Result<_>>()?;

    let capture_number = |p: &str, field: &str| -> Result<u32> {
        pattern(p)?
            .captures(body)
            .and_then(|c| c[1].parse::<u32>().ok())
            .ok_or_else(|| LabError::DrawParseError {
                message: format!("{} is missing", field),
            })
    };
    let bonus = capture_number(r#""bnusNo"\s*:\s*(\d+)"#, "bonus number")?;
    let round = capture_number(r#""drwNo"\s*:\s*(\d+)"#, "round number")?;

    let date = pattern(r#""drwNoDate"\s*:\s*"(\d{4}-\d{2}-\d{2})""#)?
        .captures(body)
        .and_then(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok());

    let winning = Ticket::new(&numbers).map_err(|e| LabError::DrawParseError {
        message: e.to_string(),
    })?;
    let bonus = u8::try_from(bonus).map_err(|_| LabError::DrawParseError {
        message: format!("bonus number {} is out of range", bonus),
    })?;
    DrawResult::new(round, date, winning, bonus)
}

pub struct HttpDrawSource {
    client: Client,
    endpoint: String,
}

impl HttpDrawSource {
    pub fn new(settings: &LottoSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn url_for(&self, round: u32) -> String {
        self.endpoint.replace("{round}", &round.to_string())
    }
}

#[async_trait]
impl DrawSource for HttpDrawSource {
    async fn fetch(&self, round: Option<u32>) -> Result<DrawResult> {
        let round = round.unwrap_or_else(|| estimate_latest_round(Utc::now().with_timezone(&kst())));
        let url = self.url_for(round);

        tracing::debug!("Requesting draw results from: {}", url);
        let response = self.client.get(&url).send().await?;
        tracing::debug!("Results response status: {}", response.status());

        if !response.status().is_success() {
            return Err(LabError::HttpStatusError {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let draw = parse_draw_response(&body)?;
        tracing::info!("Fetched round {} winning numbers {}", draw.round, draw.winning);
        Ok(draw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLE_BODY: &str = r#"{"totSellamnt":111840714000,"returnValue":"success","drwNoDate":"2024-01-06","firstWinamnt":3244461950,"drwtNo6":43,"drwtNo4":31,"firstPrzwnerCo":8,"drwtNo5":39,"bnusNo":9,"firstAccumamnt":25955695600,"drwNo":1101,"drwtNo2":7,"drwtNo3":21,"drwtNo1":1}"#;

    fn draw() -> DrawResult {
        parse_draw_response(SAMPLE_BODY).unwrap()
    }

    #[test]
    fn test_generate_tickets_are_valid_and_reproducible() {
        let mut rng = StdRng::seed_from_u64(7);
        let tickets = generate_tickets(&mut rng, 20).unwrap();
        assert_eq!(tickets.len(), 20);
        for ticket in &tickets {
            let numbers = ticket.numbers();
            assert_eq!(numbers.len(), 6);
            assert!(numbers.windows(2).all(|w| w[0] < w[1]));
            assert!(numbers.iter().all(|n| (1..=45).contains(n)));
        }

        let mut again = StdRng::seed_from_u64(7);
        assert_eq!(generate_tickets(&mut again, 20).unwrap(), tickets);
    }

    #[test]
    fn test_parse_draw_response() {
        let draw = draw();
        assert_eq!(draw.round, 1101);
        assert_eq!(draw.winning.numbers(), &[1, 7, 21, 31, 39, 43]);
        assert_eq!(draw.bonus, 9);
        assert_eq!(draw.date, NaiveDate::from_ymd_opt(2024, 1, 6));
    }

    #[test]
    fn test_parse_failed_round() {
        let err = parse_draw_response(r#"{"returnValue":"fail"}"#).unwrap_err();
        assert!(matches!(err, LabError::DrawParseError { .. }));
    }

    #[test]
    fn test_parse_missing_number() {
        let body = SAMPLE_BODY.replace(r#""drwtNo3":21,"#, "");
        let err = parse_draw_response(&body).unwrap_err();
        assert!(err.to_string().contains("winning number 3 is missing"));
    }

    #[test]
    fn test_compare_ranks() {
        let draw = draw();
        let cases: [(&[u8], Option<PrizeRank>, usize); 6] = [
            (&[1, 7, 21, 31, 39, 43], Some(PrizeRank::First), 6),
            (&[1, 7, 21, 31, 39, 9], Some(PrizeRank::Second), 5),
            (&[1, 7, 21, 31, 39, 10], Some(PrizeRank::Third), 5),
            (&[1, 7, 21, 31, 2, 3], Some(PrizeRank::Fourth), 4),
            (&[1, 7, 21, 4, 5, 6], Some(PrizeRank::Fifth), 3),
            (&[1, 7, 2, 3, 4, 9], None, 2),
        ];
        for (numbers, rank, count) in cases {
            let report = compare(&Ticket::new(numbers).unwrap(), &draw);
            assert_eq!(report.rank, rank, "{:?}", numbers);
            assert_eq!(report.match_count(), count);
        }
    }

    #[test]
    fn test_estimate_latest_round() {
        let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
        assert_eq!(estimate_latest_round(at("2002-12-01T12:00:00+09:00")), 1);
        assert_eq!(estimate_latest_round(at("2002-12-07T21:00:00+09:00")), 1);
        assert_eq!(estimate_latest_round(at("2002-12-14T20:00:00+09:00")), 1);
        assert_eq!(estimate_latest_round(at("2002-12-14T21:00:00+09:00")), 2);
        assert_eq!(estimate_latest_round(at("2024-01-06T21:00:00+09:00")), 1101);
    }

    #[tokio::test]
    async fn test_fetch_specific_round() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/draw").query_param("drwNo", "1101");
            then.status(200)
                .header("Content-Type", "text/html;charset=UTF-8")
                .body(SAMPLE_BODY);
        });

        let settings = LottoSettings {
            endpoint: format!("{}?drwNo={{round}}", server.url("/draw")),
            ..LottoSettings::default()
        };
        let source = HttpDrawSource::new(&settings).unwrap();
        let draw = source.fetch(Some(1101)).await.unwrap();

        api_mock.assert();
        assert_eq!(draw.round, 1101);
        assert_eq!(draw.bonus, 9);
    }

    #[tokio::test]
    async fn test_fetch_http_failure() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/draw");
            then.status(500);
        });

        let settings = LottoSettings {
            endpoint: format!("{}?drwNo={{round}}", server.url("/draw")),
            ..LottoSettings::default()
        };
        let source = HttpDrawSource::new(&settings).unwrap();
        let err = source.fetch(Some(5)).await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, LabError::HttpStatusError { status: 500, .. }));
    }
}
