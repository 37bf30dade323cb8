use std::sync::{Arc, Mutex};

use ab_app::SingleInstanceCoordinator;
use ab_core::{InstanceIdentity, InstanceRole, LaunchAttempt};
use ab_platform::InProcessExclusivity;

#[tokio::test]
async fn test_concurrent_launches_elect_exactly_one_primary() {
    const LAUNCHES: usize = 8;
    let exclusivity = InProcessExclusivity::new();
    let identity = InstanceIdentity::derive("demo", "alice");

    let mut tasks = Vec::new();
    for index in 0..LAUNCHES {
        let exclusivity = exclusivity.clone();
        let identity = identity.clone();
        tasks.push(tokio::spawn(async move {
            let launch = LaunchAttempt::new(vec![format!("--launch={index}")], "/tmp");
            let (coordinator, rx) =
                SingleInstanceCoordinator::new(Arc::new(exclusivity), identity, launch);
            let should_quit = coordinator.register(|_| {}).await.unwrap();
            (coordinator, rx, should_quit)
        }));
    }

    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    let primaries: Vec<_> = outcomes.iter().filter(|(_, _, quit)| !quit).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].0.role(), InstanceRole::Primary);

    let secondaries = outcomes
        .iter()
        .filter(|(c, _, quit)| *quit && c.role() == InstanceRole::Secondary)
        .count();
    assert_eq!(secondaries, LAUNCHES - 1);

    let (_, rx, _) = outcomes
        .iter_mut()
        .find(|(_, _, quit)| !quit)
        .unwrap();
    let mut forwarded = 0;
    while rx.try_recv().is_ok() {
        forwarded += 1;
    }
    assert_eq!(forwarded, LAUNCHES - 1);
}

#[tokio::test]
async fn test_released_primary_lets_next_launch_take_over() {
    let exclusivity = InProcessExclusivity::new();
    let identity = InstanceIdentity::new("handover");

    let (first, _first_rx) = SingleInstanceCoordinator::new(
        Arc::new(exclusivity.clone()),
        identity.clone(),
        LaunchAttempt::new(vec![], "/"),
    );
    assert!(!first.register(|_| {}).await.unwrap());
    first.release().await.unwrap();
    assert_eq!(first.role(), InstanceRole::Released);

    let (second, _second_rx) = SingleInstanceCoordinator::new(
        Arc::new(exclusivity),
        identity,
        LaunchAttempt::new(vec![], "/"),
    );
    assert!(!second.register(|_| {}).await.unwrap());
    assert!(second.is_primary());
}

#[tokio::test]
async fn test_forwards_before_ready_flush_in_arrival_order() {
    let exclusivity = InProcessExclusivity::new();
    let identity = InstanceIdentity::new("queued");
    let seen = Arc::new(Mutex::new(Vec::new()));

    let (primary, mut rx) = SingleInstanceCoordinator::new(
        Arc::new(exclusivity.clone()),
        identity.clone(),
        LaunchAttempt::new(vec![], "/"),
    );
    let sink = seen.clone();
    primary
        .register(move |attempt: &LaunchAttempt| sink.lock().unwrap().push(attempt.argv.clone()))
        .await
        .unwrap();

    for arg in ["a", "b", "c"] {
        let (secondary, _rx) = SingleInstanceCoordinator::new(
            Arc::new(exclusivity.clone()),
            identity.clone(),
            LaunchAttempt::new(vec![arg.to_string()], "/"),
        );
        assert!(secondary.register(|_| {}).await.unwrap());
    }

    while let Ok(attempt) = rx.try_recv() {
        primary.deliver(attempt);
    }
    assert_eq!(primary.pending_count(), 3);
    assert!(seen.lock().unwrap().is_empty());

    primary.mark_ready();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![vec!["a".to_string()], vec!["b".to_string()], vec!["c".to_string()]]
    );
}
