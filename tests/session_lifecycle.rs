mod common;

use common::{ManualFeed, dec, engine_with, fee_market_state};
use speedup_fee::errors::RecalcSkip;
use speedup_fee::models::{FeeDataResult, FeePair, GasAnalyticsParams, GasTier};
use speedup_fee::services::speedup::{
    FeeDataObserver, RecalcOutcome, SessionCommand, SessionExit, SpeedUpSession, run_session,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<(FeeDataResult, GasAnalyticsParams, bool)>>>,
}

impl Recorder {
    fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last(&self) -> (FeeDataResult, GasAnalyticsParams, bool) {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

impl FeeDataObserver for Recorder {
    fn on_fee_data(&mut self, fee_data: &FeeDataResult, analytics: &GasAnalyticsParams, animate: bool) {
        self.calls
            .lock()
            .unwrap()
            .push((fee_data.clone(), analytics.clone(), animate));
    }
}

fn market() -> speedup_fee::models::GasFeeState {
    fee_market_state(("90", "1"), ("120", "3"), ("150", "5"), "80")
}

fn session(feed: Arc<ManualFeed>, recorder: &Recorder) -> SpeedUpSession {
    let (engine, _) = engine_with(("100", "2"), 21000, Some("1"), Some("2000"));
    SpeedUpSession::start(engine, feed, Box::new(recorder.clone()))
}

#[test]
fn cancel_releases_token_once_and_silences_stale_ticks() {
    let feed = ManualFeed::new();
    let recorder = Recorder::default();
    let mut session = session(feed.clone(), &recorder);
    let token = session.poll_token().unwrap();

    session.on_tick(token, &market()).unwrap();
    assert_eq!(recorder.count(), 1);

    let mut cancelled = false;
    session.cancel(|| cancelled = true);
    assert!(cancelled);
    assert_eq!(*feed.unsubscribed.lock().unwrap(), vec![token]);

    // 新会话收到旧 token 的推送也不会触发回调
    let mut next = self::session(feed.clone(), &recorder);
    let outcome = next.on_tick(token, &market()).unwrap();
    assert!(matches!(
        outcome,
        RecalcOutcome::Skipped(RecalcSkip::InactiveSubscription(_))
    ));
    assert_eq!(recorder.count(), 1);
    drop(next);
    assert_eq!(feed.unsubscribe_count(), 2);
}

#[test]
fn observer_receives_analytics_and_animate_flag() {
    let feed = ManualFeed::new();
    let recorder = Recorder::default();
    let mut session = session(feed, &recorder);
    let token = session.poll_token().unwrap();

    session.on_tick(token, &market()).unwrap();
    let (fee_data, analytics, animate) = recorder.last();
    assert_eq!(fee_data.selected_option, Some(GasTier::Medium));
    assert_eq!(analytics.speed_set, Some(GasTier::Medium));
    assert_eq!(analytics.view, "Transactions (Speed Up)");
    assert_eq!(
        serde_json::to_value(&analytics).unwrap()["gas_mode"],
        serde_json::json!("Basic")
    );
    assert!(animate);

    session
        .on_change(FeePair::new(dec("130"), dec("4")).into(), None)
        .unwrap();
    let (_, analytics, animate) = recorder.last();
    assert_eq!(analytics.speed_set, None);
    assert!(!animate);

    // 输入未变化时不通知
    session.on_tick(token, &market()).unwrap();
    assert_eq!(recorder.count(), 2);
}

#[test]
fn save_returns_latest_fee_data() {
    let feed = ManualFeed::new();
    let recorder = Recorder::default();
    let mut session = session(feed.clone(), &recorder);
    let token = session.poll_token().unwrap();
    session.on_tick(token, &market()).unwrap();

    let saved = session.save(|fee_data| fee_data);
    assert_eq!(saved.unwrap().max_fee_per_gas, dec("120"));
    assert_eq!(feed.unsubscribe_count(), 1);
}

#[tokio::test]
async fn run_session_processes_ticks_then_cancels() {
    let feed = ManualFeed::new();
    let recorder = Recorder::default();
    feed.push(market());
    let session = session(feed.clone(), &recorder);

    let (tx, rx) = mpsc::channel(4);
    let handle = tokio::spawn(run_session(session, rx));

    tx.send(SessionCommand::Change {
        input: FeePair::new(dec("0"), dec("0")).into(),
        selected: Some(GasTier::High),
    })
    .await
    .unwrap();
    tx.send(SessionCommand::Cancel).await.unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(exit, SessionExit::Cancelled);
    assert_eq!(feed.unsubscribe_count(), 1);

    let before = recorder.count();
    assert!(before >= 2);
    assert_eq!(recorder.last().0.selected_option, Some(GasTier::High));

    // 会话结束后的推送没有任何回调
    feed.push(fee_market_state(("91", "1"), ("121", "3"), ("151", "5"), "81"));
    tokio::task::yield_now().await;
    assert_eq!(recorder.count(), before);
}

#[tokio::test]
async fn run_session_saves_on_command() {
    let feed = ManualFeed::new();
    let recorder = Recorder::default();
    let session = session(feed.clone(), &recorder);

    let (tx, rx) = mpsc::channel(4);
    let handle = tokio::spawn(run_session(session, rx));
    feed.push(market());

    // 等待推送被处理
    for _ in 0..100 {
        if recorder.count() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tx.send(SessionCommand::Save).await.unwrap();

    let exit = handle.await.unwrap().unwrap();
    match exit {
        SessionExit::Saved(Some(fee_data)) => assert_eq!(fee_data.max_fee_per_gas, dec("120")),
        other => panic!("unexpected exit: {:?}", other),
    }
    assert_eq!(feed.unsubscribe_count(), 1);
}

#[tokio::test]
async fn dropped_command_channel_cancels_session() {
    let feed = ManualFeed::new();
    let recorder = Recorder::default();
    let session = session(feed.clone(), &recorder);

    let (tx, rx) = mpsc::channel(1);
    drop(tx);
    let exit = run_session(session, rx).await.unwrap();
    assert_eq!(exit, SessionExit::Cancelled);
    assert_eq!(feed.unsubscribe_count(), 1);
}
