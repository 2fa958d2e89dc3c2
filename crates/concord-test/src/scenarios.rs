//! End-to-end authority scenarios
//!
//! Delivery across edges is unordered, so these assert on final settled
//! output and on properties every intermediate emission must satisfy.

use std::time::Duration;

use async_trait::async_trait;
use concord_authority::{
    spawn_derived, spawn_event, spawn_list_selection, spawn_open, spawn_pure_event, AuthorityConfig,
};
use concord_core::{AuthorityId, CombinedInputs};
use concord_flow::{Reducer, Source};

use crate::{jittered, JitterConfig, Probe};

const QUIET: Duration = Duration::from_millis(200);

/// Output is `base`, doubled while the flag is set
struct Doubling {
    base: i64,
}

#[async_trait]
impl Reducer for Doubling {
    type Inputs = CombinedInputs<()>;
    type State = bool;
    type Event = ();
    type Output = i64;

    async fn reduce_inputs(&self, state: Option<bool>, _inputs: &Self::Inputs) -> bool {
        state.unwrap_or(false)
    }

    async fn reduce_event(&self, state: bool, _toggle: (), _inputs: &Self::Inputs) -> bool {
        !state
    }

    async fn select(&self, state: &bool, _inputs: &Self::Inputs) -> i64 {
        if *state {
            self.base * 2
        } else {
            self.base
        }
    }
}

/// Counts clicks on top of one numeric input
struct Clicks {
    base: AuthorityId,
}

#[async_trait]
impl Reducer for Clicks {
    type Inputs = CombinedInputs<i64>;
    type State = i64;
    type Event = i64;
    type Output = i64;

    async fn reduce_inputs(&self, state: Option<i64>, _inputs: &Self::Inputs) -> i64 {
        state.unwrap_or(0)
    }

    async fn reduce_event(&self, state: i64, clicks: i64, _inputs: &Self::Inputs) -> i64 {
        state + clicks
    }

    async fn select(&self, state: &i64, inputs: &Self::Inputs) -> i64 {
        inputs.get(self.base).copied().unwrap_or_default() + state
    }
}

#[tokio::test]
async fn test_double_toggle_of_zero_emits_once() {
    let toggle = spawn_pure_event(Doubling { base: 0 }, AuthorityConfig::named("toggle"));
    let mut probe = Probe::spawn("toggle");
    toggle.subscribe(probe.destination());

    let first = probe.recv().await.expect("initial value");
    assert_eq!(first.value, 0);
    assert_eq!(first.semantic, Some(toggle.id()));
    assert_eq!(first.version.get(toggle.id()), Some(0));

    toggle.dispatch_event(());
    toggle.dispatch_event(());
    assert!(probe.expect_silence(QUIET).await);
}

#[tokio::test]
async fn test_open_authority_replace_and_transform() {
    let counter = spawn_open(10i64, AuthorityConfig::named("counter"));
    let mut probe = Probe::spawn("counter");
    counter.subscribe(probe.destination());
    assert_eq!(probe.recv().await.map(|s| s.value), Some(10));

    counter.transform(|v| v + 5);
    counter.replace(100);
    counter.transform(|v| v * 2);

    let values: Vec<i64> = [probe.recv().await, probe.recv().await, probe.recv().await]
        .into_iter()
        .flatten()
        .map(|s| s.value)
        .collect();
    assert_eq!(values, vec![15, 100, 200]);

    // Counter is the authority's own; one tick per emission
    let versions: Vec<Option<u64>> = probe.seen().iter().map(|s| s.version.get(counter.id())).collect();
    assert_eq!(versions, vec![Some(0), Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_late_subscriber_gets_current_value() {
    let name = spawn_open("first".to_string(), AuthorityConfig::default());
    let mut early = Probe::spawn("early");
    name.subscribe(early.destination());
    name.replace("second".to_string());
    assert_eq!(
        early.settle(QUIET).await.map(|s| s.value.clone()),
        Some("second".to_string())
    );

    let mut late = Probe::spawn("late");
    name.subscribe(late.destination());
    assert_eq!(late.recv().await.map(|s| s.value), Some("second".to_string()));
    assert!(late.expect_silence(QUIET).await);
}

#[tokio::test]
async fn test_diamond_never_glitches() {
    let root = spawn_open(1i64, AuthorityConfig::named("root"));
    let root_id = root.id();

    let doubled = spawn_derived(
        vec![root.source()],
        move |inputs: &CombinedInputs<i64>, cache: ()| (inputs.get(root_id).copied().unwrap_or_default() * 2, cache),
        AuthorityConfig::named("doubled"),
    );
    let incremented = spawn_derived(
        vec![root.source()],
        move |inputs: &CombinedInputs<i64>, cache: ()| (inputs.get(root_id).copied().unwrap_or_default() + 1, cache),
        AuthorityConfig::named("incremented"),
    );

    let (doubled_id, incremented_id) = (doubled.id(), incremented.id());
    let jitter = JitterConfig {
        max_ms: 5,
        ..JitterConfig::default()
    };
    let pair = spawn_derived(
        vec![
            jittered(doubled.source(), jitter.clone()),
            jittered(incremented.source(), jitter),
        ],
        move |inputs: &CombinedInputs<i64>, cache: ()| {
            let d = inputs.get(doubled_id).copied().unwrap_or_default();
            let i = inputs.get(incremented_id).copied().unwrap_or_default();
            ((d, i), cache)
        },
        AuthorityConfig::named("pair"),
    );

    let mut probe = Probe::spawn("pair");
    pair.subscribe(probe.destination());

    for value in 2..=30 {
        root.replace(value);
    }

    let last = probe.settle(2 * QUIET).await.map(|s| s.value);
    assert_eq!(last, Some((60, 31)));

    // Both sides always derive from the same root value
    for snapshot in probe.seen() {
        let (d, i) = snapshot.value;
        assert_eq!(d, 2 * (i - 1), "glitch in {:?}", snapshot);
        assert_eq!(snapshot.semantic, Some(pair.id()));
        assert!(snapshot.version.contains(root_id));
    }

    let stages = [doubled, incremented];
    futures::future::join_all(stages.iter().map(|stage| {
        stage.stop();
        stage.stopped()
    }))
    .await;
}

#[tokio::test]
async fn test_event_authority_over_input() {
    let base = spawn_open(100i64, AuthorityConfig::named("base"));
    let clicks = spawn_event(
        vec![base.source()],
        Clicks { base: base.id() },
        AuthorityConfig::named("clicks"),
    );
    let mut probe = Probe::spawn("clicks");
    clicks.subscribe(probe.destination());

    clicks.dispatch_event(1);
    clicks.dispatch_event(2);
    assert_eq!(probe.settle(QUIET).await.map(|s| s.value), Some(103));

    base.replace(200);
    let latest = probe.settle(QUIET).await.cloned().expect("value after input change");
    assert_eq!(latest.value, 203);
    assert_eq!(latest.version.get(base.id()), Some(1));
    assert!(latest.version.contains(clicks.id()));
}

/// Parity of one numeric input
struct Parity {
    base: AuthorityId,
}

#[async_trait]
impl Reducer for Parity {
    type Inputs = CombinedInputs<i64>;
    type State = ();
    type Event = ();
    type Output = i64;

    async fn reduce_inputs(&self, _state: Option<()>, _inputs: &Self::Inputs) {}

    async fn reduce_event(&self, _state: (), _event: (), _inputs: &Self::Inputs) {}

    async fn select(&self, _state: &(), inputs: &Self::Inputs) -> i64 {
        inputs.get(self.base).copied().unwrap_or_default() % 2
    }
}

#[tokio::test]
async fn test_input_change_with_same_value_is_emitted() {
    let base = spawn_open(1i64, AuthorityConfig::named("base"));
    let parity = spawn_event(
        vec![base.source()],
        Parity { base: base.id() },
        AuthorityConfig::named("parity"),
    );
    let mut probe = Probe::spawn("parity");
    parity.subscribe(probe.destination());
    assert_eq!(probe.recv().await.map(|s| s.value), Some(1));

    // Same output, new input version
    base.replace(3);
    let bumped = probe.recv().await.expect("version bump is emitted");
    assert_eq!(bumped.value, 1);
    assert_eq!(bumped.version.get(base.id()), Some(1));
    assert_eq!(bumped.version.get(parity.id()), Some(1));

    // Nothing changed at all
    parity.dispatch_event(());
    assert!(probe.expect_silence(QUIET).await);
}

#[tokio::test]
async fn test_list_selection_follows_list() {
    let list = spawn_open(Some(vec!["a", "b", "c"]), AuthorityConfig::named("list"));
    let selection = spawn_list_selection(list.source(), AuthorityConfig::named("selection"));
    let mut probe = Probe::spawn("selection");
    selection.subscribe(probe.destination());

    selection.select(Some("b"));
    assert_eq!(probe.settle(QUIET).await.map(|s| s.value), Some(Some("b")));

    // Still present
    list.replace(Some(vec!["b", "c"]));
    assert_eq!(probe.settle(QUIET).await.map(|s| s.value), Some(Some("b")));

    // Removed from the list
    list.replace(Some(vec!["c"]));
    assert_eq!(probe.settle(QUIET).await.map(|s| s.value), Some(None));

    // Not in the list; still nothing selected, so nothing new
    selection.select(Some("z"));
    assert!(probe.settle(QUIET).await.is_none());

    selection.select(Some("c"));
    assert_eq!(probe.settle(QUIET).await.map(|s| s.value), Some(Some("c")));

    // List unavailable
    list.replace(None);
    assert_eq!(probe.settle(QUIET).await.map(|s| s.value), Some(None));
}

#[derive(Clone, Debug, PartialEq)]
enum Field {
    Count(i64),
    Label(String),
}

#[tokio::test]
async fn test_heterogeneous_sources() {
    let count = spawn_open(3i64, AuthorityConfig::named("count"));
    let label = spawn_open("items".to_string(), AuthorityConfig::named("label"));
    let (count_id, label_id) = (count.id(), label.id());

    let summary = spawn_derived(
        vec![count.source_map(Field::Count), label.source_map(Field::Label)],
        move |inputs: &CombinedInputs<Field>, cache: ()| {
            let summary = match (inputs.get(count_id), inputs.get(label_id)) {
                (Some(Field::Count(n)), Some(Field::Label(l))) => format!("{} {}", n, l),
                _ => String::new(),
            };
            (summary, cache)
        },
        AuthorityConfig::named("summary"),
    );

    let mut probe = Probe::spawn("summary");
    summary.subscribe(probe.destination());
    assert_eq!(
        probe.settle(QUIET).await.map(|s| s.value.clone()),
        Some("3 items".to_string())
    );

    count.replace(4);
    assert_eq!(
        probe.settle(QUIET).await.map(|s| s.value.clone()),
        Some("4 items".to_string())
    );
}

#[tokio::test]
async fn test_stopped_authority_goes_quiet() {
    let root = spawn_open(0i64, AuthorityConfig::named("root"));
    let root_id = root.id();
    let mirror = spawn_derived(
        vec![root.source()],
        move |inputs: &CombinedInputs<i64>, cache: ()| (inputs.get(root_id).copied().unwrap_or_default(), cache),
        AuthorityConfig::named("mirror"),
    );
    let mut probe = Probe::spawn("mirror");
    mirror.subscribe(probe.destination());
    assert_eq!(probe.settle(QUIET).await.map(|s| s.value), Some(0));

    mirror.stop();
    mirror.stopped().await;
    probe.settle(QUIET).await;
    let before = probe.seen().len();

    root.replace(1);
    assert!(probe.expect_silence(QUIET).await);
    assert_eq!(probe.seen().len(), before);
}

#[tokio::test]
async fn test_unmanaged_authority_waits_for_connect() {
    let root = spawn_open(1i64, AuthorityConfig::named("root"));
    let root_id = root.id();
    let mirror = spawn_derived(
        vec![root.source()],
        move |inputs: &CombinedInputs<i64>, cache: ()| (inputs.get(root_id).copied().unwrap_or_default(), cache),
        AuthorityConfig {
            manage_own_subscriptions: false,
            ..AuthorityConfig::named("mirror")
        },
    );
    let mut probe = Probe::spawn("mirror");
    mirror.subscribe(probe.destination());

    root.replace(8);
    assert!(probe.expect_silence(QUIET).await);

    mirror.connect();
    let connected = probe.settle(QUIET).await.cloned().expect("output once connected");
    assert_eq!(connected.value, 8);
    assert_eq!(connected.semantic, Some(mirror.id()));
    assert_eq!(connected.version.get(root_id), Some(1));

    mirror.disconnect();
    tokio::time::sleep(QUIET).await;
    root.replace(9);
    assert!(probe.expect_silence(QUIET).await);
}

#[tokio::test]
async fn test_replay_depth_two_for_late_subscriber() {
    let counter = spawn_open(
        0i64,
        AuthorityConfig {
            replay_depth: 2,
            ..AuthorityConfig::named("counter")
        },
    );
    let mut early = Probe::spawn("early");
    counter.subscribe(early.destination());
    counter.replace(1);
    counter.replace(2);

    let values: Vec<i64> = [early.recv().await, early.recv().await, early.recv().await]
        .into_iter()
        .flatten()
        .map(|s| s.value)
        .collect();
    assert_eq!(values, vec![0, 1, 2]);

    let mut late = Probe::spawn("late");
    counter.subscribe(late.destination());
    assert_eq!(late.recv().await.map(|s| s.value), Some(1));
    assert_eq!(late.recv().await.map(|s| s.value), Some(2));
    assert!(late.expect_silence(QUIET).await);
}

/// Counts events
struct Count;

#[async_trait]
impl Reducer for Count {
    type Inputs = CombinedInputs<()>;
    type State = i64;
    type Event = i64;
    type Output = i64;

    async fn reduce_inputs(&self, state: Option<i64>, _inputs: &Self::Inputs) -> i64 {
        state.unwrap_or(0)
    }

    async fn reduce_event(&self, state: i64, step: i64, _inputs: &Self::Inputs) -> i64 {
        state + step
    }

    async fn select(&self, state: &i64, _inputs: &Self::Inputs) -> i64 {
        *state
    }
}

#[tokio::test]
async fn test_zero_source_authorities_emit() {
    let count = spawn_event(Vec::<Source<()>>::new(), Count, AuthorityConfig::named("count"));
    let mut count_probe = Probe::spawn("count");
    count.subscribe(count_probe.destination());

    for _ in 0..3 {
        count.dispatch_event(1);
    }
    let latest = count_probe.settle(QUIET).await.cloned().expect("event output");
    assert_eq!(latest.value, 3);
    assert_eq!(latest.version.len(), 1);
    assert!(latest.version.contains(count.id()));

    let constant = spawn_derived(
        Vec::<Source<()>>::new(),
        |inputs: &CombinedInputs<()>, cache: ()| (inputs.len(), cache),
        AuthorityConfig::named("constant"),
    );
    let mut constant_probe = Probe::spawn("constant");
    constant.subscribe(constant_probe.destination());
    let only = constant_probe.recv().await.expect("derived output");
    assert_eq!(only.value, 0);
    assert!(only.version.is_empty());
    assert_eq!(only.semantic, Some(constant.id()));
}
