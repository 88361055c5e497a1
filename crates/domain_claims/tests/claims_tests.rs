//! Comprehensive tests for domain_claims

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;

use core_kernel::{AgreementId, Currency, EvidenceId, Money, Timezone};
use domain_claims::{
    escrow_hold, submit_claim, tenant_can_view, tenant_visible_claims, ClaimCategory,
    ClaimError, ClaimRequest, ClaimStatus, DepositClaim, LandlordDecision, SettlementRoute,
    TenantResponse,
};
use domain_escrow::{Deposit, DepositStatus};

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn open_deposit() -> Deposit {
    let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    Deposit::open(
        AgreementId::new(),
        usd(dec!(5000)),
        end,
        Timezone::default(),
        Timezone::default().start_of_day(end) - Duration::days(180),
    )
    .unwrap()
}

fn in_window(deposit: &Deposit) -> DateTime<Utc> {
    deposit.inspection_window().opens_at() + Duration::days(1)
}

fn request(amount: Money, title: &str) -> ClaimRequest {
    ClaimRequest {
        amount,
        category: ClaimCategory::Damage,
        title: title.to_string(),
        description: format!("{} found at inspection", title),
        evidence: vec![EvidenceId::new()],
    }
}

// ============================================================================
// Submission
// ============================================================================

mod submission {
    use super::*;

    #[test]
    fn test_submit_creates_submitted_claim() {
        let deposit = open_deposit();
        let now = in_window(&deposit);

        let claim =
            submit_claim(&deposit, &[], request(usd(dec!(300)), "Broken window"), now).unwrap();

        assert_eq!(claim.status(), &ClaimStatus::Submitted);
        assert!(claim.is_open());
        assert_eq!(claim.submitted_at(), now);
        assert_eq!(claim.version(), 1);
    }

    #[test]
    fn test_multiple_claims_within_cap() {
        let deposit = open_deposit();
        let now = in_window(&deposit);

        let first =
            submit_claim(&deposit, &[], request(usd(dec!(2000)), "Damage"), now).unwrap();
        let second = submit_claim(
            &deposit,
            std::slice::from_ref(&first),
            request(usd(dec!(2500)), "Cleaning"),
            now,
        )
        .unwrap();

        let held = escrow_hold(&[first, second], Money::zero(Currency::USD)).unwrap();
        assert_eq!(held, usd(dec!(4500)));
    }

    #[test]
    fn test_claims_beyond_remainder_rejected() {
        let deposit = open_deposit();
        let now = in_window(&deposit);

        let result = submit_claim(&deposit, &[], request(usd(dec!(5000.01)), "Too big"), now);
        assert!(matches!(
            result,
            Err(ClaimError::InsufficientEscrowBalance { .. })
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let deposit = open_deposit();
        let now = in_window(&deposit);

        let result = submit_claim(
            &deposit,
            &[],
            request(Money::zero(Currency::USD), "Nothing"),
            now,
        );
        assert!(matches!(result, Err(ClaimError::AmountNotPositive { .. })));
    }

    #[test]
    fn test_window_boundaries_enforced() {
        let deposit = open_deposit();
        let window = deposit.inspection_window();

        assert!(submit_claim(
            &deposit,
            &[],
            request(usd(dec!(100)), "Early"),
            window.opens_at() - Duration::seconds(1),
        )
        .is_err());

        assert!(submit_claim(
            &deposit,
            &[],
            request(usd(dec!(100)), "On open"),
            window.opens_at(),
        )
        .is_ok());

        assert!(submit_claim(
            &deposit,
            &[],
            request(usd(dec!(100)), "On close"),
            window.closes_at(),
        )
        .is_err());
    }
}

// ============================================================================
// Tenant response and dispute resolution
// ============================================================================

mod resolution_flow {
    use super::*;

    fn submitted(deposit: &Deposit, amount: Money) -> DepositClaim {
        submit_claim(deposit, &[], request(amount, "Damage"), in_window(deposit)).unwrap()
    }

    #[test]
    fn test_accept_flow_settles_into_escrow() {
        // Scenario: claim 300.00 accepted in full out of 5000.00
        let mut deposit = open_deposit();
        let mut claim = submitted(&deposit, usd(dec!(300)));
        let now = in_window(&deposit);

        claim.mark_tenant_notified(now).unwrap();
        let settlement = claim
            .tenant_respond(TenantResponse::Accept, None, vec![], now)
            .unwrap()
            .expect("acceptance settles immediately");

        deposit
            .apply_claim_settlement(claim.id(), settlement, now)
            .unwrap();

        assert_eq!(deposit.released_to_landlord(), usd(dec!(300)));
        assert_eq!(deposit.remaining_in_escrow(), usd(dec!(4700)));
        assert_eq!(
            claim.settled_amount().unwrap(),
            usd(dec!(300)),
        );
    }

    #[test]
    fn test_counter_offer_flow() {
        // Scenario 4 from the operation contracts: 300 claimed, 150 counter,
        // landlord accepts the counter.
        let mut deposit = open_deposit();
        let mut claim = submitted(&deposit, usd(dec!(300)));
        let now = in_window(&deposit);

        claim.mark_tenant_notified(now).unwrap();
        claim
            .tenant_respond(
                TenantResponse::PartialAccept {
                    counter_amount: usd(dec!(150)),
                },
                Some("Pre-existing wear".to_string()),
                vec![EvidenceId::new()],
                now,
            )
            .unwrap();
        assert_eq!(claim.status_name(), "disputed");

        let settlement = claim
            .landlord_respond(LandlordDecision::AcceptCounter, None, now)
            .unwrap()
            .expect("accepting the counter settles");
        assert_eq!(settlement, usd(dec!(150)));

        deposit
            .apply_claim_settlement(claim.id(), settlement, now)
            .unwrap();

        assert_eq!(deposit.released_to_landlord(), usd(dec!(150)));
        assert_eq!(deposit.remaining_in_escrow(), usd(dec!(4850)));
        match claim.status() {
            ClaimStatus::Accepted { route, .. } => {
                assert_eq!(*route, SettlementRoute::CounterOffer)
            }
            other => panic!("Expected Accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_settlement_never_exceeds_claimed_or_remainder() {
        let deposit = open_deposit();
        let mut claim = submitted(&deposit, usd(dec!(300)));
        let now = in_window(&deposit);

        claim
            .tenant_respond(TenantResponse::Accept, None, vec![], now)
            .unwrap();

        let settled = claim.settled_amount().unwrap();
        assert!(settled.amount() <= claim.claimed_amount().amount());
        assert!(settled.amount() <= deposit.remaining_in_escrow().amount());
    }

    #[test]
    fn test_escalated_amount_stays_in_escrow() {
        // Scenario 5: window closes with one escalated claim for 200.00
        let mut deposit = open_deposit();
        let mut claim = submitted(&deposit, usd(dec!(200)));
        let now = in_window(&deposit);

        claim.mark_tenant_notified(now).unwrap();
        claim
            .tenant_respond(TenantResponse::Reject, None, vec![], now)
            .unwrap();
        claim
            .landlord_respond(LandlordDecision::Escalate, Some("To mediation".into()), now)
            .unwrap();
        deposit.mark_disputed(now).unwrap();

        let hold = escrow_hold(
            std::slice::from_ref(&claim),
            Money::zero(Currency::USD),
        )
        .unwrap();
        assert_eq!(hold, usd(dec!(200)));

        let close = deposit.inspection_window().closes_at();
        let released = deposit
            .auto_release_undisputed_remainder(hold, close)
            .unwrap();

        assert_eq!(released, usd(dec!(4800)));
        assert_eq!(deposit.remaining_in_escrow(), usd(dec!(200)));
        assert_eq!(deposit.status(), DepositStatus::Disputed);
    }

    #[test]
    fn test_mediation_outcome_through_settlement_entry_point() {
        let mut deposit = open_deposit();
        let mut claim = submitted(&deposit, usd(dec!(200)));
        let now = in_window(&deposit);

        claim
            .tenant_respond(TenantResponse::Reject, None, vec![], now)
            .unwrap();
        claim
            .landlord_respond(LandlordDecision::Escalate, None, now)
            .unwrap();

        let after_close = deposit.inspection_window().closes_at() + Duration::days(30);
        let settled = claim
            .record_mediation_outcome(usd(dec!(80)), after_close)
            .unwrap();
        deposit
            .apply_claim_settlement(claim.id(), settled, after_close)
            .unwrap();

        assert_eq!(deposit.released_to_landlord(), usd(dec!(80)));
        assert!(claim.escrow_hold().is_zero());
        match claim.status() {
            ClaimStatus::Accepted { route, .. } => assert_eq!(*route, SettlementRoute::Mediation),
            other => panic!("Expected Accepted, got {:?}", other),
        }
    }
}

// ============================================================================
// Visibility
// ============================================================================

mod visibility_rules {
    use super::*;

    #[test]
    fn test_tenant_blind_until_notified() {
        let deposit = open_deposit();
        let window = deposit.inspection_window();
        let now = in_window(&deposit);

        let mut claim =
            submit_claim(&deposit, &[], request(usd(dec!(300)), "Damage"), now).unwrap();
        assert!(!tenant_can_view(&claim, &window, now));

        claim.mark_tenant_notified(now).unwrap();
        assert!(tenant_can_view(&claim, &window, now));
    }

    #[test]
    fn test_window_close_reveals_everything() {
        let deposit = open_deposit();
        let window = deposit.inspection_window();
        let now = in_window(&deposit);

        let claim =
            submit_claim(&deposit, &[], request(usd(dec!(300)), "Damage"), now).unwrap();

        let claims = vec![claim];
        assert!(tenant_visible_claims(&claims, &window, now).is_empty());
        assert_eq!(
            tenant_visible_claims(&claims, &window, window.closes_at()).len(),
            1
        );
    }
}
