use dining_philosophers::{
    AcquisitionStrategy, CapturedLog, DiningConfig, DiningEvent, DiningTable, LogWriter,
    PhaseTiming, Side,
};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

fn fast_config(philosophers: usize, deadline_ms: u64) -> DiningConfig {
    DiningConfig::new(philosophers)
        .with_deadline(Duration::from_millis(deadline_ms))
        .with_timing(PhaseTiming::from_millis(1, 4).unwrap())
}

/// Runs a table to completion and returns its parsed event log.
async fn run_table(config: DiningConfig) -> (Vec<(usize, DiningEvent)>, Vec<u64>) {
    let capture = CapturedLog::start();
    let table = DiningTable::new(config, capture.client()).expect("valid config");
    let forks = table.forks().to_vec();

    let summary = table.run().await.expect("table should finish cleanly");
    for (index, fork) in forks.iter().enumerate() {
        let guard = fork
            .try_acquire(usize::MAX)
            .unwrap_or_else(|| panic!("fork {index} still held by {:?}", fork.holder()));
        assert_eq!(guard.fork_index(), index);
    }
    assert!(forks.iter().all(|f| f.holder().is_none()));

    let lines = capture.finish().await;
    let events = lines
        .iter()
        .map(|line| {
            DiningEvent::parse_line(line).unwrap_or_else(|| panic!("malformed line: {line:?}"))
        })
        .collect();
    let meals = summary.reports.iter().map(|r| r.meals).collect();
    (events, meals)
}

/// Two philosophers with a short deadline both leave the table, and nothing is heard
/// from a philosopher after it is done.
#[tokio::test]
async fn test_two_philosophers_stop_at_deadline() {
    let started = Instant::now();
    let (events, _) = run_table(fast_config(2, 200)).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2), "shutdown took {elapsed:?}");

    for id in 0..2 {
        let done: Vec<_> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == (id, DiningEvent::Done))
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(done.len(), 1, "philosopher {id} must be done exactly once");

        let after = events[done[0] + 1..].iter().filter(|(who, _)| *who == id).count();
        assert_eq!(after, 0, "philosopher {id} kept going after it was done");
    }
}

/// Replays the captured log as fork ownership and checks that no fork ever has two
/// holders, that eating happens with both forks, and that nothing is held while
/// thinking or after leaving.
#[tokio::test]
async fn test_log_replay_shows_mutual_exclusion() {
    let seats = 8;
    let (events, meals) = run_table(fast_config(seats, 300)).await;

    let mut holders: Vec<Option<usize>> = vec![None; seats];
    let held_by = |holders: &[Option<usize>], id: usize| {
        holders.iter().filter(|h| **h == Some(id)).count()
    };

    for &(id, event) in &events {
        let left = Side::Left.fork_index(id, seats);
        let right = Side::Right.fork_index(id, seats);
        match event {
            DiningEvent::PickedUp(side) => {
                let fork = side.fork_index(id, seats);
                assert_eq!(holders[fork], None, "fork {fork} taken by {id} while held");
                holders[fork] = Some(id);
            }
            DiningEvent::Eating => {
                assert_eq!(holders[left], Some(id));
                assert_eq!(holders[right], Some(id));
            }
            DiningEvent::PutDownForks => {
                assert_eq!(holders[left], Some(id));
                assert_eq!(holders[right], Some(id));
                holders[left] = None;
                holders[right] = None;
            }
            DiningEvent::Thinking | DiningEvent::Done => {
                assert_eq!(held_by(&holders, id), 0, "{id} holds a fork while {event}");
            }
        }
    }
    assert!(holders.iter().all(Option::is_none));

    let eaten = events.iter().filter(|(_, e)| *e == DiningEvent::Eating).count() as u64;
    assert_eq!(eaten, meals.iter().sum::<u64>());
}

/// Every line produced by many concurrent philosophers is one complete event.
#[tokio::test]
async fn test_concurrent_lines_are_atomic() {
    let seats = 12;
    let capture = CapturedLog::start();
    let config = DiningConfig::new(seats)
        .with_deadline(Duration::from_millis(300))
        .with_timing(PhaseTiming::from_millis(0, 1).unwrap());
    let table = DiningTable::new(config, capture.client()).unwrap();
    table.run().await.unwrap();

    let lines = capture.finish().await;
    assert!(lines.len() > seats * 2);

    let mut seen = HashSet::new();
    for line in &lines {
        let (id, _) = DiningEvent::parse_line(line)
            .unwrap_or_else(|| panic!("interleaved or malformed line: {line:?}"));
        assert!(id < seats);
        seen.insert(id);
    }
    assert_eq!(seen.len(), seats, "every philosopher should have logged");
}

/// The first fork each philosopher picks up in a cycle follows the parity rule.
#[tokio::test]
async fn test_parity_order_in_the_log() {
    let seats = 5;
    let (events, _) = run_table(fast_config(seats, 200)).await;

    let mut expecting_first = vec![true; seats];
    for (id, event) in events {
        match event {
            DiningEvent::PickedUp(side) if expecting_first[id] => {
                let expected = if id % 2 == 0 { Side::Right } else { Side::Left };
                assert_eq!(side, expected, "philosopher {id} started with the wrong fork");
                expecting_first[id] = false;
            }
            DiningEvent::PutDownForks => expecting_first[id] = true,
            _ => {}
        }
    }
}

/// Nobody stays blocked forever: with either safe strategy every seat gets to eat.
#[tokio::test]
async fn test_every_philosopher_eats() {
    for strategy in [AcquisitionStrategy::Parity, AcquisitionStrategy::Ordered] {
        for seats in [2, 3, 5, 8] {
            let config = fast_config(seats, 400).with_strategy(strategy);
            let (_, meals) = run_table(config).await;

            assert_eq!(meals.len(), seats);
            assert!(
                meals.iter().all(|&m| m > 0),
                "{strategy} with {seats} seats starved someone: {meals:?}"
            );
        }
    }
}

/// After the stop signal fires, a philosopher finishes the cycle it is in: it may think
/// once more, but never reaches for a fork after that, and leaves exactly once.
#[tokio::test]
async fn test_stop_is_final_for_every_philosopher() {
    let seats = 6;
    let capture = CapturedLog::start();
    let config = DiningConfig::new(seats).with_timing(PhaseTiming::from_millis(1, 3).unwrap());
    let table = DiningTable::new(config, capture.client()).unwrap();
    let stop = table.stop_signal();
    let marker = capture.client();
    let run = tokio::spawn(table.run());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(stop.trigger());
    marker.log("-- stop --");
    drop(marker);
    run.await.unwrap().unwrap();

    let lines = capture.finish().await;
    let split = lines
        .iter()
        .position(|l| l == "-- stop --")
        .expect("stop marker is logged");

    let mut after_stop: HashMap<usize, Vec<DiningEvent>> = HashMap::new();
    for line in &lines[split + 1..] {
        let (id, event) = DiningEvent::parse_line(line)
            .unwrap_or_else(|| panic!("malformed line: {line:?}"));
        after_stop.entry(id).or_default().push(event);
    }

    for id in 0..seats {
        let done = lines
            .iter()
            .filter(|l| **l == DiningEvent::Done.line(id))
            .count();
        assert_eq!(done, 1, "philosopher {id} must leave exactly once");

        let events = after_stop.get(&id).cloned().unwrap_or_default();
        let thinking: Vec<_> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == DiningEvent::Thinking)
            .map(|(pos, _)| pos)
            .collect();
        assert!(thinking.len() <= 1, "philosopher {id} kept cycling: {events:?}");

        if let Some(&last) = thinking.last() {
            assert!(
                !events[last..]
                    .iter()
                    .any(|e| matches!(e, DiningEvent::PickedUp(_))),
                "philosopher {id} reached for a fork after stopping: {events:?}"
            );
        }
    }
}

/// More philosophers than Tokio's default blocking pool holds (512) all dine at once.
#[tokio::test]
async fn test_table_larger_than_the_blocking_pool() {
    let seats = 520;
    let (writer, log) = LogWriter::new();
    drop(writer);

    let config = DiningConfig::new(seats)
        .with_deadline(Duration::from_millis(1500))
        .with_timing(PhaseTiming::from_millis(1, 2).unwrap());
    let summary = DiningTable::new(config, log)
        .unwrap()
        .run()
        .await
        .expect("every philosopher gets a thread");

    assert_eq!(summary.reports.len(), seats);
    let hungry: Vec<_> = summary
        .reports
        .iter()
        .filter(|r| r.meals == 0)
        .map(|r| r.id)
        .collect();
    assert!(hungry.is_empty(), "never ate: {hungry:?}");
}
