use chrono::Duration;
use liveball_bot::event::MatchUpdateKind;
use liveball_bot::service::maintenance_service::MaintenanceService;
use liveball_bot::service::match_tracking_service::MatchTrackingService;

mod common;

use common::at;
use common::match_event;

const EPL: &str = "English Premier League";

macro_rules! tracking_test {
    ($name:ident, |$db:ident, $service:ident| $body:block) => {
        #[tokio::test]
        async fn $name() {
            let ($db, db_path) = common::setup_db().await;
            let $service = MatchTrackingService::new($db.clone());

            $body

            common::teardown_db(db_path).await;
        }
    };
}

fn kinds(updates: &[liveball_bot::event::MatchUpdateEvent]) -> Vec<MatchUpdateKind> {
    updates.iter().map(|u| u.kind).collect()
}

tracking_test!(kickoff_goal_full_time_sequence, |db, service| {
    let user = common::create_user(&db, "15550001", true, "").await;
    let now = at("2026-10-18T14:00:00Z");

    let ticks = [
        (match_event("9", EPL, "1H", (Some(0), Some(0))), vec![MatchUpdateKind::Kickoff]),
        (match_event("9", EPL, "1H", (Some(0), Some(0))), vec![]),
        (match_event("9", EPL, "1H", (Some(1), Some(0))), vec![MatchUpdateKind::Goal]),
        (match_event("9", EPL, "HT", (Some(1), Some(0))), vec![]),
        (match_event("9", EPL, "2H", (Some(1), Some(1))), vec![MatchUpdateKind::Goal]),
        (match_event("9", EPL, "Match Finished", (Some(1), Some(1))), vec![MatchUpdateKind::FullTime]),
        (match_event("9", EPL, "Match Finished", (Some(1), Some(1))), vec![]),
    ];

    for (i, (event, expected)) in ticks.into_iter().enumerate() {
        let updates = service
            .track_user(&user, &[event], now + Duration::minutes(5 * i as i64))
            .await
            .updates;
        assert_eq!(kinds(&updates), expected, "tick {i}");
    }
});

tracking_test!(finished_first_seen_never_notifies, |db, service| {
    let user = common::create_user(&db, "15550001", true, "").await;
    let event = match_event("2", EPL, "Match Finished", (Some(2), Some(1)));

    let first = service.track_user(&user, &[event.clone()], at("2026-10-18T14:00:00Z")).await.updates;
    assert!(first.is_empty());
    let state = db
        .match_state
        .select_by_user_and_event("15550001", "2")
        .await
        .unwrap()
        .expect("state is created on first sight");
    assert_eq!(state.scores(), (Some(2), Some(1)));
    assert_eq!(state.status, "Match Finished");

    let second = service.track_user(&user, &[event], at("2026-10-18T14:05:00Z")).await.updates;
    assert!(second.is_empty());
    let state = db
        .match_state
        .select_by_user_and_event("15550001", "2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.updated_at, at("2026-10-18T14:05:00Z"));
});

tracking_test!(finished_to_live_regression_is_silent, |db, service| {
    let user = common::create_user(&db, "15550001", true, "").await;
    let finished = match_event("2", EPL, "Match Finished", (Some(2), Some(1)));
    let live = match_event("2", EPL, "Live", (Some(2), Some(1)));

    service.track_user(&user, &[finished], at("2026-10-18T14:00:00Z")).await;
    let updates = service.track_user(&user, &[live.clone()], at("2026-10-18T14:05:00Z")).await.updates;
    assert!(updates.is_empty());

    let state = db.match_state.select_by_user_and_event("15550001", "2").await.unwrap().unwrap();
    assert_eq!(state.status, "Match Finished");

    // Returning to finished afterwards must not fire a second full time.
    let updates = service
        .track_user(&user, &[match_event("2", EPL, "FT", (Some(2), Some(1)))], at("2026-10-18T14:10:00Z"))
        .await
        .updates;
    assert!(updates.is_empty());
});

tracking_test!(untrackable_events_leave_no_state, |db, service| {
    let user = common::create_user(&db, "15550001", true, "").await;
    let events = vec![
        match_event("1", EPL, "", (None, None)),
        match_event("3", EPL, "Postponed", (None, None)),
        match_event("4", EPL, "Weird Status", (None, None)),
        match_event("", EPL, "1H", (Some(0), Some(0))),
        match_event("  ", EPL, "1H", (Some(0), Some(0))),
    ];

    let updates = service.track_user(&user, &events, at("2026-10-18T14:00:00Z")).await.updates;
    assert!(updates.is_empty());
    assert!(db.match_state.select_all_by_phone("15550001").await.unwrap().is_empty());
});

tracking_test!(league_filter_applies_per_user, |db, service| {
    let epl_fan = common::create_user(&db, "15550001", true, "epl").await;
    let liga_fan = common::create_user(&db, "15550002", true, "laliga").await;
    let events = vec![
        match_event("10", EPL, "1H", (Some(0), Some(0))),
        match_event("11", "Spanish La Liga", "1H", (Some(0), Some(0))),
        match_event("12", "German 2. Bundesliga", "1H", (Some(0), Some(0))),
    ];
    let now = at("2026-10-18T14:00:00Z");

    let updates = service.track_user(&epl_fan, &events, now).await.updates;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].event.id, "10");
    assert_eq!(updates[0].phone, "15550001");

    let updates = service.track_user(&liga_fan, &events, now).await.updates;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].event.id, "11");
});

tracking_test!(score_with_empty_status_counts_as_live, |db, service| {
    let user = common::create_user(&db, "15550001", true, "").await;
    let updates = service
        .track_user(&user, &[match_event("5", EPL, "", (Some(0), Some(0)))], at("2026-10-18T14:00:00Z"))
        .await
        .updates;
    assert_eq!(kinds(&updates), vec![MatchUpdateKind::Kickoff]);
    assert!(updates[0].message.contains("Arsenal vs Chelsea"));
});

tracking_test!(storage_error_skips_only_the_failing_event, |db, service| {
    let user = common::create_user(&db, "15550001", true, "").await;
    common::fail_state_writes_for(&db, "2").await;
    let events = vec![
        match_event("1", EPL, "1H", (Some(0), Some(0))),
        match_event("2", EPL, "1H", (Some(0), Some(0))),
        match_event("3", EPL, "1H", (Some(0), Some(0))),
    ];

    let tracking = service.track_user(&user, &events, at("2026-10-18T14:00:00Z")).await;
    assert_eq!(tracking.failed_events, 1);
    let ids: Vec<_> = tracking.updates.iter().map(|u| u.event.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert!(db.match_state.select_by_user_and_event("15550001", "2").await.unwrap().is_none());

    // Once storage recovers the skipped event gets its kickoff, the others stay quiet.
    common::restore_state_writes(&db).await;
    let tracking = service.track_user(&user, &events, at("2026-10-18T14:05:00Z")).await;
    assert_eq!(tracking.failed_events, 0);
    assert_eq!(kinds(&tracking.updates), vec![MatchUpdateKind::Kickoff]);
    assert_eq!(tracking.updates[0].event.id, "2");
});

tracking_test!(sweep_removes_only_expired_state, |db, service| {
    let user = common::create_user(&db, "15550001", true, "").await;
    let old = at("2026-10-16T10:00:00Z");
    let recent = at("2026-10-18T10:00:00Z");
    service
        .track_user(&user, &[match_event("1", EPL, "FT", (Some(1), Some(0)))], old)
        .await;
    service
        .track_user(&user, &[match_event("2", EPL, "1H", (Some(0), Some(0)))], recent)
        .await;

    let maintenance = MaintenanceService::new(db.clone());
    let report = maintenance
        .sweep_expired(at("2026-10-18T12:00:00Z"), Duration::hours(48))
        .await
        .unwrap();
    assert_eq!(report.match_states, 1);

    let left = db.match_state.select_all_by_phone("15550001").await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].event_id, "2");
});
