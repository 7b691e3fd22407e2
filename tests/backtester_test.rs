use anyhow::bail;
use bar_replay::backtester::{BacktestConfig, BacktestError, Backtester, FailureStage};
use bar_replay::broker::{Broker, sim::BrokerSim};
use bar_replay::data_feed::csv_data_feed::CsvDataFeed;
use bar_replay::strategy::{SignalFn, noop::NoopStrategy};
use bar_replay::types::{Numeric, Order, OrderSide, Trade};
use std::sync::Arc;

mod common;
use common::bar;

fn sim() -> Arc<dyn Broker> {
    Arc::new(BrokerSim::default())
}

#[test]
fn test_single_market_buy_on_first_bar() {
    let bars = vec![
        bar("t1", 10.0, 12.0, 9.0, 11.0),
        bar("t2", 11.0, 13.0, 10.0, 12.0),
    ];
    let strategy = SignalFn::new("first-bar", |bar: &bar_replay::types::Bar| {
        if bar.ts == "t1" {
            Ok(vec![Order::market(OrderSide::Buy, 10)])
        } else {
            Ok(vec![])
        }
    });
    let mut backtester = Backtester::new(Box::new(strategy), sim(), BacktestConfig::default());
    let trades = backtester.run(&bars).unwrap();
    assert_eq!(
        trades,
        &[Trade {
            ts: "t1".into(),
            side: OrderSide::Buy,
            qty: 10,
            price: 11.0,
            tag: "bt".into(),
        }]
    );
}

#[test]
fn test_trades_follow_bar_then_order_sequence() {
    let bars = vec![
        bar("b1", 10.0, 11.0, 9.0, 10.5),
        bar("b2", 10.5, 12.0, 10.0, 11.5),
        bar("b3", 11.5, 13.0, 11.0, 12.5),
    ];
    let strategy = SignalFn::new("two-per-bar", |bar: &bar_replay::types::Bar| {
        Ok(vec![
            Order::market(OrderSide::Buy, 1).with_tag(format!("{}-a", bar.ts)),
            Order::market(OrderSide::Sell, 2).with_tag(format!("{}-b", bar.ts)),
        ])
    });
    let mut backtester = Backtester::new(Box::new(strategy), sim(), BacktestConfig::default());
    let trades = backtester.run(&bars).unwrap();
    let tags: Vec<&str> = trades.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(tags, ["b1-a", "b1-b", "b2-a", "b2-b", "b3-a", "b3-b"]);
    let ts: Vec<&str> = trades.iter().map(|t| t.ts.as_str()).collect();
    assert_eq!(ts, ["b1", "b1", "b2", "b2", "b3", "b3"]);
    assert_eq!(trades[1].price, 10.5);
    assert_eq!(trades[5].price, 12.5);
}

#[test]
fn test_signal_failure_only_skips_its_bar() {
    let bars: Vec<_> = (1..=5)
        .map(|i| bar(&format!("T{i}"), 10.0, 12.0, 9.0, 11.0))
        .collect();
    let strategy = SignalFn::new("flaky", |bar: &bar_replay::types::Bar| {
        if bar.ts == "T3" {
            bail!("indicator not ready");
        }
        Ok(vec![Order::market(OrderSide::Buy, 1)])
    });
    let mut backtester = Backtester::new(Box::new(strategy), sim(), BacktestConfig::default());
    let trades = backtester.run(&bars).unwrap();
    let ts: Vec<&str> = trades.iter().map(|t| t.ts.as_str()).collect();
    assert_eq!(ts, ["T1", "T2", "T4", "T5"]);

    let failures = backtester.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].ts, "T3");
    assert_eq!(failures[0].stage, FailureStage::Signal);
    assert!(failures[0].message.contains("indicator not ready"));
}

#[test]
fn test_unfilled_order_is_not_retried() {
    let bars = vec![
        bar("t1", 110.0, 115.0, 110.0, 112.0),
        bar("t2", 104.0, 106.0, 100.0, 102.0),
    ];
    let mut submitted = false;
    let strategy = SignalFn::new("once", move |_: &bar_replay::types::Bar| {
        if submitted {
            return Ok(vec![]);
        }
        submitted = true;
        Ok(vec![Order::limit(OrderSide::Buy, 1, 105.0)])
    });
    let mut backtester = Backtester::new(Box::new(strategy), sim(), BacktestConfig::default());
    assert!(backtester.run(&bars).unwrap().is_empty());
}

#[test]
fn test_broker_error_aborts_and_keeps_earlier_trades() {
    let bars = vec![
        bar("t1", 10.0, 12.0, 9.0, 11.0),
        bar("t2", 11.0, 13.0, 10.0, 12.0),
        bar("t3", 12.0, 14.0, 11.0, 13.0),
    ];
    let strategy = SignalFn::new("bad-price", |bar: &bar_replay::types::Bar| {
        let mut order = Order::market(OrderSide::Buy, 1);
        if bar.ts == "t2" {
            order.price = Some(Numeric::from("twelve"));
        }
        Ok(vec![order])
    });
    let mut backtester = Backtester::new(Box::new(strategy), sim(), BacktestConfig::default());
    let err = backtester.run(&bars).unwrap_err();
    let BacktestError::Broker { ts, .. } = err;
    assert_eq!(ts, "t2");
    assert_eq!(backtester.trades().len(), 1);
    assert_eq!(backtester.trades()[0].ts, "t1");
}

#[test]
fn test_broker_error_can_be_skipped() {
    let bars = vec![
        bar("t1", 10.0, 12.0, 9.0, 11.0),
        bar("t2", 11.0, 13.0, 10.0, 12.0),
    ];
    let strategy = SignalFn::new("bad-first", |_: &bar_replay::types::Bar| {
        let mut bad = Order::market(OrderSide::Sell, 1);
        bad.price = Some(Numeric::from("?"));
        Ok(vec![bad, Order::market(OrderSide::Buy, 1)])
    });
    let config = BacktestConfig {
        continue_on_broker_error: true,
    };
    let mut backtester = Backtester::new(Box::new(strategy), sim(), config);
    let trades = backtester.run(&bars).unwrap();
    assert_eq!(trades.len(), 2);
    assert!(trades.iter().all(|t| t.side == OrderSide::Buy));
    assert_eq!(backtester.failures().len(), 2);
    assert!(
        backtester
            .failures()
            .iter()
            .all(|f| f.stage == FailureStage::Broker)
    );
}

#[test]
fn test_noop_strategy_over_feed() {
    let file = common::generate_backtest_csv();
    let path = file.path().to_string_lossy().to_string();
    let mut feed = CsvDataFeed::new("backtest".into(), path, None).unwrap();
    let strategy = NoopStrategy {
        name: "noop".into(),
    };
    let mut backtester = Backtester::new(Box::new(strategy), sim(), BacktestConfig::default());
    assert!(backtester.run_feed(&mut feed).unwrap().is_empty());
    assert!(backtester.failures().is_empty());
}
