//! `!calls` and `!puts <symbol> <date> <strike>`

use super::{GENERIC_ERROR, is_ticker_symbol};
use crate::api::{OptionContract, OptionSide, OptionsProvider};
use crate::error::StockError;
use crate::format::option_table;
use agent_tools::{CommandContext, CommandHandler, Outcome};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error};

const USAGE: &str = "Sorry, I don't understand.\nI need the symbol, date (YYYY-MM-DD) and strike";

/// Rows shown on each side of the closest strike
const WINDOW_RADIUS: usize = 2;

/// Rows of `chain` around the strike closest to `strike`
///
/// `chain` must be sorted by strike. Returns `None` when `strike` lies
/// outside the listed strikes. On a tie the lower strike wins.
pub fn select_strike_window(chain: &[OptionContract], strike: f64) -> Option<&[OptionContract]> {
    let (first, last) = (chain.first()?, chain.last()?);
    if strike < first.strike || strike > last.strike {
        return None;
    }

    let closest = chain
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (a.strike - strike)
                .abs()
                .total_cmp(&(b.strike - strike).abs())
        })
        .map(|(idx, _)| idx)?;

    let start = closest.saturating_sub(WINDOW_RADIUS);
    let end = (closest + WINDOW_RADIUS + 1).min(chain.len());
    Some(&chain[start..end])
}

/// One side of an options chain around a strike
pub struct OptionsCommand {
    side: OptionSide,
    options: Arc<dyn OptionsProvider>,
}

impl OptionsCommand {
    pub fn new(side: OptionSide, options: Arc<dyn OptionsProvider>) -> Self {
        Self { side, options }
    }
}

struct OptionsQuery<'a> {
    symbol: &'a str,
    expiry: NaiveDate,
    strike: f64,
}

fn parse_query(args: &[String]) -> Option<OptionsQuery<'_>> {
    let [symbol, date, strike] = args else {
        return None;
    };
    Some(OptionsQuery {
        symbol,
        expiry: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?,
        strike: strike.parse::<f64>().ok().filter(|s| s.is_finite())?,
    })
}

#[async_trait]
impl CommandHandler for OptionsCommand {
    fn keyword(&self) -> &str {
        self.side.keyword()
    }

    fn help_text(&self) -> &str {
        match self.side {
            OptionSide::Calls => "Get call options, e.g. !calls TSLA 2020-09-11 420",
            OptionSide::Puts => "Get put options, e.g. !puts TSLA 2020-09-11 400",
        }
    }

    async fn invoke(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Outcome {
        let Some(query) = parse_query(args) else {
            debug!(side = %self.side, ?args, "Malformed options request");
            return Outcome::reply(USAGE);
        };
        let symbol = query.symbol.to_uppercase();
        if !is_ticker_symbol(&symbol) {
            return Outcome::error(format!("Sorry, I couldn't find {}", query.symbol));
        }

        let chain = match self
            .options
            .option_chain(&symbol, query.expiry, self.side)
            .await
        {
            Ok(chain) => chain,
            Err(StockError::SymbolNotFound(_)) => {
                return Outcome::error(format!("Sorry, I couldn't find {}", query.symbol));
            }
            Err(e) if e.is_not_found() => {
                debug!(symbol, "Options lookup found nothing: {e}");
                return no_expiry(&symbol, query.expiry);
            }
            Err(e) => {
                error!(symbol, side = %self.side, "Options lookup failed: {e}");
                return Outcome::error(GENERIC_ERROR);
            }
        };

        if chain.is_empty() {
            return no_expiry(&symbol, query.expiry);
        }

        match select_strike_window(&chain, query.strike) {
            Some(window) => Outcome::reply(option_table(window)),
            None => Outcome::error(format!(
                "I couldn't find any options at strike {}",
                query.strike
            )),
        }
    }
}

fn no_expiry(symbol: &str, expiry: NaiveDate) -> Outcome {
    Outcome::error(format!(
        "I couldn't find any options for {symbol} expiring {expiry}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockOptionsProvider;
    use crate::bot::test_support::invoke;
    use agent_tools::CommandRegistry;
    use mockall::predicate::{always, eq};

    fn chain(strikes: &[f64]) -> Vec<OptionContract> {
        strikes
            .iter()
            .map(|&strike| OptionContract {
                strike,
                ask: 1.0,
                bid: 0.9,
                volume: Some(10),
                implied_volatility: 0.5,
                in_the_money: false,
            })
            .collect()
    }

    fn strikes(window: &[OptionContract]) -> Vec<f64> {
        window.iter().map(|c| c.strike).collect()
    }

    #[test]
    fn test_window_includes_exact_match() {
        let chain = chain(&[400.0, 410.0, 420.0, 430.0, 440.0, 450.0, 460.0]);
        let window = select_strike_window(&chain, 430.0).unwrap();
        assert_eq!(strikes(window), vec![410.0, 420.0, 430.0, 440.0, 450.0]);
    }

    #[test]
    fn test_interior_window_is_two_rows_each_side() {
        let strikes_listed: Vec<f64> = (0..20).map(|i| 300.0 + 10.0 * f64::from(i)).collect();
        let chain = chain(&strikes_listed);

        for target in [330.0, 401.0, 459.0] {
            let window = select_strike_window(&chain, target).unwrap();
            assert_eq!(window.len(), 2 * WINDOW_RADIUS + 1, "target {target}");
            let centre = window[WINDOW_RADIUS].strike;
            assert!((centre - target).abs() <= 5.0, "target {target}, centre {centre}");
        }

        let window = select_strike_window(&chain, 400.0).unwrap();
        assert_eq!(strikes(window), vec![380.0, 390.0, 400.0, 410.0, 420.0]);
    }

    #[test]
    fn test_window_uses_closest_strike() {
        let chain = chain(&[400.0, 410.0, 420.0, 430.0, 440.0, 450.0, 460.0]);
        let window = select_strike_window(&chain, 433.0).unwrap();
        assert!(strikes(window).contains(&430.0));
        assert_eq!(window.len(), 5);

        // Halfway between 420 and 430 picks the lower strike
        let window = select_strike_window(&chain, 425.0).unwrap();
        assert_eq!(strikes(window), vec![400.0, 410.0, 420.0, 430.0, 440.0]);
    }

    #[test]
    fn test_window_clamps_at_edges() {
        let chain = chain(&[400.0, 410.0, 420.0, 430.0]);
        assert_eq!(
            strikes(select_strike_window(&chain, 400.0).unwrap()),
            vec![400.0, 410.0, 420.0]
        );
        assert_eq!(
            strikes(select_strike_window(&chain, 430.0).unwrap()),
            vec![410.0, 420.0, 430.0]
        );
    }

    #[test]
    fn test_window_out_of_range() {
        let chain = chain(&[400.0, 410.0, 420.0]);
        assert!(select_strike_window(&chain, 399.5).is_none());
        assert!(select_strike_window(&chain, 420.5).is_none());
        assert!(select_strike_window(&[], 400.0).is_none());
    }

    #[tokio::test]
    async fn test_calls_renders_window() {
        let mut provider = MockOptionsProvider::new();
        let expiry = NaiveDate::from_ymd_opt(2020, 9, 11).unwrap();
        provider
            .expect_option_chain()
            .with(eq("TSLA"), eq(expiry), eq(OptionSide::Calls))
            .times(1)
            .returning(|_, _, _| Ok(chain(&[400.0, 410.0, 420.0, 430.0, 440.0, 450.0])));

        let handler = OptionsCommand::new(OptionSide::Calls, Arc::new(provider));
        let (outcome, _) =
            invoke(&handler, &CommandRegistry::new(), &["TSLA", "2020-09-11", "420"]).await;

        let text = outcome.text().unwrap();
        assert!(matches!(outcome, Outcome::Replied(_)));
        assert!(text.contains("strike"));
        assert!(text.contains("400"));
        assert!(text.contains("440"));
        assert!(!text.contains("450"));
    }

    #[tokio::test]
    async fn test_wrong_arity_never_calls_provider() {
        let mut provider = MockOptionsProvider::new();
        provider.expect_option_chain().times(0);
        let handler = OptionsCommand::new(OptionSide::Puts, Arc::new(provider));
        let registry = CommandRegistry::new();

        for args in [
            &["TSLA", "2020-09-11"][..],
            &["TSLA", "2020-09-11", "420", "extra"][..],
            &[][..],
            &["TSLA", "2020-09-11", "lots"][..],
            &["TSLA", "09/11/2020", "420"][..],
        ] {
            let (outcome, _) = invoke(&handler, &registry, args).await;
            assert_eq!(outcome, Outcome::reply(USAGE), "args: {args:?}");
        }
    }

    #[tokio::test]
    async fn test_strike_outside_chain() {
        let mut provider = MockOptionsProvider::new();
        provider
            .expect_option_chain()
            .with(always(), always(), always())
            .returning(|_, _, _| Ok(chain(&[400.0, 410.0])));

        let handler = OptionsCommand::new(OptionSide::Calls, Arc::new(provider));
        let (outcome, _) =
            invoke(&handler, &CommandRegistry::new(), &["TSLA", "2020-09-11", "900"]).await;
        assert_eq!(
            outcome,
            Outcome::error("I couldn't find any options at strike 900")
        );
    }

    #[tokio::test]
    async fn test_provider_errors() {
        let mut provider = MockOptionsProvider::new();
        provider
            .expect_option_chain()
            .returning(|symbol, expiry, _| {
                Err(match symbol {
                    "ZZZZ" => StockError::SymbolNotFound(symbol.to_string()),
                    "TSLA" => StockError::DataUnavailable {
                        symbol: symbol.to_string(),
                        reason: format!("no options expiring {expiry}"),
                    },
                    _ => StockError::ApiError("503".to_string()),
                })
            });

        let handler = OptionsCommand::new(OptionSide::Puts, Arc::new(provider));
        let registry = CommandRegistry::new();

        let (outcome, _) = invoke(&handler, &registry, &["zzzz", "2020-09-12", "1"]).await;
        assert_eq!(outcome, Outcome::error("Sorry, I couldn't find zzzz"));

        let (outcome, _) = invoke(&handler, &registry, &["tsla", "2020-09-12", "420"]).await;
        assert_eq!(
            outcome,
            Outcome::error("I couldn't find any options for TSLA expiring 2020-09-12")
        );

        let (outcome, _) = invoke(&handler, &registry, &["AAPL", "2020-09-11", "120"]).await;
        assert_eq!(outcome, Outcome::error(GENERIC_ERROR));
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let mut provider = MockOptionsProvider::new();
        provider
            .expect_option_chain()
            .returning(|_, _, _| Ok(Vec::new()));

        let handler = OptionsCommand::new(OptionSide::Calls, Arc::new(provider));
        let (outcome, _) =
            invoke(&handler, &CommandRegistry::new(), &["AAPL", "2020-09-11", "120"]).await;
        assert_eq!(
            outcome,
            Outcome::error("I couldn't find any options for AAPL expiring 2020-09-11")
        );
    }
}
