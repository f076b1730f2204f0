use chrono::Duration;
use liveball_bot::entity::MatchStateModel;
use liveball_bot::entity::UserModel;
use liveball_bot::repository::table::Table;

mod common;

use common::at;

// Handles setup, execution, and teardown automatically.
macro_rules! db_test {
    ($name:ident, |$db:ident| $body:block) => {
        #[tokio::test]
        async fn $name() {
            let ($db, db_path) = common::setup_db().await;

            $body

            common::teardown_db(db_path).await;
        }
    };
}

// Inserts a match state with defaults, allowing overrides.
macro_rules! create_state {
    ($db:expr, $phone:expr, $event_id:expr) => {
        create_state!($db, $phone, $event_id, {})
    };
    ($db:expr, $phone:expr, $event_id:expr, { $($field:ident : $val:expr),* }) => {
        {
            #[allow(unused_mut)]
            let mut state = MatchStateModel {
                key: MatchStateModel::key_for($phone, $event_id),
                phone: $phone.to_string(),
                event_id: $event_id.to_string(),
                home: "Home".to_string(),
                away: "Away".to_string(),
                status: "1H".to_string(),
                updated_at: at("2026-10-18T12:00:00Z"),
                ..Default::default()
            };
            $(state.$field = $val.into();)*
            $db.match_state.insert(&state).await.expect("Failed to insert match state");
            state
        }
    };
}

mod user_table_tests {
    use super::*;

    db_test!(insert_and_select, |db| {
        let user = common::create_user(&db, "15550001", false, "epl,ucl").await;
        let fetched = db.user.select(&user.phone).await.unwrap().unwrap();
        assert_eq!(fetched.leagues, "epl,ucl");
        assert!(!fetched.auto_updates);
    });

    db_test!(duplicate_phone_is_rejected, |db| {
        common::create_user(&db, "15550001", false, "").await;
        let again = UserModel {
            phone: "15550001".to_string(),
            ..Default::default()
        };
        assert!(db.user.insert(&again).await.is_err());
    });

    db_test!(select_all_with_auto_updates, |db| {
        common::create_user(&db, "15550002", true, "").await;
        common::create_user(&db, "15550001", true, "").await;
        common::create_user(&db, "15550003", false, "").await;

        let users = db.user.select_all_with_auto_updates().await.unwrap();
        let phones: Vec<_> = users.iter().map(|u| u.phone.as_str()).collect();
        assert_eq!(phones, vec!["15550001", "15550002"]);
    });

    db_test!(update_leagues_and_alerts, |db| {
        common::create_user(&db, "15550001", false, "").await;
        db.user.update_leagues("15550001", "laliga").await.unwrap();
        db.user.update_auto_updates("15550001", true).await.unwrap();

        let fetched = db.user.select(&"15550001".to_string()).await.unwrap().unwrap();
        assert_eq!(fetched.leagues, "laliga");
        assert!(fetched.auto_updates);
    });
}

mod match_state_table_tests {
    use super::*;

    db_test!(insert_and_select_by_user_and_event, |db| {
        let state = create_state!(db, "15550001", "42", {
            home_score: Some(1),
            away_score: Some(0)
        });

        let fetched = db
            .match_state
            .select_by_user_and_event("15550001", "42")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, state);
        assert!(
            db.match_state
                .select_by_user_and_event("15550002", "42")
                .await
                .unwrap()
                .is_none()
        );
    });

    db_test!(null_scores_roundtrip, |db| {
        create_state!(db, "15550001", "42");
        let fetched = db
            .match_state
            .select_by_user_and_event("15550001", "42")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.scores(), (None, None));
    });

    db_test!(replace_keeps_one_row_per_pair, |db| {
        let mut state = create_state!(db, "15550001", "42");
        state.home_score = Some(2);
        state.away_score = Some(2);
        state.status = "2H".to_string();
        db.match_state.replace(&state).await.unwrap();
        db.match_state.replace(&state).await.unwrap();

        let all = db.match_state.select_all_by_phone("15550001").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, "2H");
        assert_eq!(all[0].scores(), (Some(2), Some(2)));
    });

    db_test!(delete_older_than_only_removes_old_rows, |db| {
        let now = at("2026-10-20T12:00:00Z");
        create_state!(db, "15550001", "old", { updated_at: now - Duration::hours(49) });
        create_state!(db, "15550001", "fresh", { updated_at: now - Duration::hours(47) });

        let deleted = db
            .match_state
            .delete_older_than(&(now - Duration::hours(48)))
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let left = db.match_state.select_all_by_phone("15550001").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].event_id, "fresh");
    });
}

mod message_log_table_tests {
    use super::*;

    db_test!(insert_if_absent_detects_duplicates, |db| {
        let now = at("2026-10-18T12:00:00Z");
        assert!(db.message_log.insert_if_absent("wamid.1", &now).await.unwrap());
        assert!(!db.message_log.insert_if_absent("wamid.1", &now).await.unwrap());
        assert!(db.message_log.insert_if_absent("wamid.2", &now).await.unwrap());
    });

    db_test!(delete_older_than, |db| {
        let now = at("2026-10-18T12:00:00Z");
        db.message_log
            .insert_if_absent("old", &(now - Duration::days(3)))
            .await
            .unwrap();
        db.message_log.insert_if_absent("new", &now).await.unwrap();

        let deleted = db
            .message_log
            .delete_older_than(&(now - Duration::days(2)))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(db.message_log.select(&"new".to_string()).await.unwrap().is_some());
    });
}
