//! Property test: the seat ledger stays consistent under arbitrary
//! register/unregister sequences.

#![allow(clippy::unwrap_used)]

use conference_central_core::FixedClock;
use conference_central_memory::InMemoryStore;
use conference_central_registration::{
    ConferenceForm, ConferenceId, Identity, RegistrationService,
};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Op {
    Register(u8),
    Unregister(u8),
}

fn op_strategy(users: u8) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..users).prop_map(Op::Register),
        (0..users).prop_map(Op::Unregister),
    ]
}

fn identity(user: u8) -> Identity {
    Identity::new(format!("user-{user}"), format!("user-{user}@example.com"))
}

async fn seed(service: &RegistrationService, max_attendees: u32) -> ConferenceId {
    let organizer = Identity::new("organizer", "org@example.com");
    service
        .create_conference(
            &organizer,
            ConferenceForm {
                name: "Invariant Conf".to_string(),
                description: None,
                topics: vec![],
                city: None,
                start_date: None,
                end_date: None,
                max_attendees,
            },
        )
        .await
        .unwrap()
        .id
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any sequence of (possibly failing) register and unregister
    /// calls, the number of seats taken equals the number of attending
    /// profiles, and availability never leaves `0..=max_attendees`.
    #[test]
    fn seats_match_attendance(
        max_attendees in 1u32..6,
        ops in proptest::collection::vec(op_strategy(8), 0..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let service = RegistrationService::new(
                Arc::new(InMemoryStore::new()),
                Arc::new(FixedClock::for_tests()),
            );
            let conference_id = seed(&service, max_attendees).await;

            for op in ops {
                // Failures (sold out, double registration, not registered)
                // are expected; only the final books matter.
                match op {
                    Op::Register(user) => {
                        let _ = service
                            .register_for_conference(&identity(user), conference_id)
                            .await;
                    }
                    Op::Unregister(user) => {
                        let _ = service
                            .unregister_from_conference(&identity(user), conference_id)
                            .await;
                    }
                }
            }

            let conference = service.get_conference(conference_id).await.unwrap();
            prop_assert!(conference.seats_available <= conference.max_attendees);

            let mut attending = 0u32;
            for user in 0u8..8 {
                let profile = service.get_profile(&identity(user)).await.unwrap();
                if profile.is_attending(conference_id) {
                    attending += 1;
                }
            }
            prop_assert_eq!(conference.seats_taken(), attending);
            prop_assert!(attending <= max_attendees);
            Ok(())
        })?;
    }
}
