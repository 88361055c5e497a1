//! Comprehensive tests for domain_agreement

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{
    Currency, DateRange, DepositId, Money, PartyId, PartyRole, PaymentOutcome, PropertyId,
};

use domain_agreement::{
    AgreementBuilder, AgreementError, AgreementEvent, AgreementState, TenancyAgreement,
    DEPOSIT_PAYMENT_WINDOW_HOURS, FEE_PAYMENT_WINDOW_HOURS, SIGNATURE_WINDOW_HOURS,
};

fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn lease_term() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
    )
    .unwrap()
}

fn create_agreement(rent: Money) -> TenancyAgreement {
    AgreementBuilder::new()
        .property(PropertyId::new())
        .landlord(PartyId::new())
        .tenant(PartyId::new())
        .monthly_rent(rent)
        .lease_term(lease_term())
        .created_at(test_now())
        .build()
        .unwrap()
}

fn success() -> PaymentOutcome {
    PaymentOutcome::Success {
        reference: "ch_test_1".to_string(),
    }
}

// ============================================================================
// Creation
// ============================================================================

mod creation {
    use super::*;

    #[test]
    fn test_created_in_pending_signatures_with_deadline() {
        let agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        assert_eq!(agreement.status_name(), "pending_signatures");
        assert_eq!(
            agreement.expires_at(),
            Some(test_now() + Duration::hours(SIGNATURE_WINDOW_HOURS))
        );
        assert_eq!(agreement.version(), 1);
    }

    #[test]
    fn test_deposit_is_two_and_a_half_months_rent() {
        let agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        assert_eq!(agreement.security_deposit().amount(), dec!(5000.00));
    }

    #[test]
    fn test_fee_is_computed_from_rent() {
        let agreement = create_agreement(Money::new(dec!(1850), Currency::USD));
        assert_eq!(agreement.agreement_fee().amount(), dec!(92.50));
    }

    #[test]
    fn test_build_rejects_non_positive_rent() {
        let result = AgreementBuilder::new()
            .property(PropertyId::new())
            .landlord(PartyId::new())
            .tenant(PartyId::new())
            .monthly_rent(Money::zero(Currency::USD))
            .lease_term(lease_term())
            .build();

        assert!(matches!(result, Err(AgreementError::Validation(_))));
    }

    #[test]
    fn test_build_requires_parties() {
        let result = AgreementBuilder::new()
            .property(PropertyId::new())
            .monthly_rent(Money::new(dec!(2000), Currency::USD))
            .lease_term(lease_term())
            .build();

        assert!(matches!(
            result,
            Err(AgreementError::MissingRequiredField(_))
        ));
    }
}

// ============================================================================
// Signature collection
// ============================================================================

mod signing {
    use super::*;

    #[test]
    fn test_single_signature_stays_pending() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement.sign(PartyRole::Landlord, test_now()).unwrap();

        assert_eq!(agreement.status_name(), "pending_signatures");
        assert!(agreement.signed_at(PartyRole::Landlord).is_some());
        assert!(agreement.signed_at(PartyRole::Tenant).is_none());
    }

    #[test]
    fn test_second_signature_advances_and_resets_deadline() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        let landlord_at = test_now();
        let tenant_at = test_now() + Duration::hours(5);

        agreement.sign(PartyRole::Landlord, landlord_at).unwrap();
        agreement.sign(PartyRole::Tenant, tenant_at).unwrap();

        assert_eq!(agreement.status_name(), "pending_payment");
        assert_eq!(
            agreement.expires_at(),
            Some(tenant_at + Duration::hours(FEE_PAYMENT_WINDOW_HOURS))
        );
    }

    #[test]
    fn test_signing_order_does_not_matter() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement.sign(PartyRole::Tenant, test_now()).unwrap();
        agreement
            .sign(PartyRole::Landlord, test_now() + Duration::hours(1))
            .unwrap();

        assert_eq!(agreement.status_name(), "pending_payment");
    }

    #[test]
    fn test_double_sign_rejected_not_double_counted() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        let first = test_now();

        agreement.sign(PartyRole::Tenant, first).unwrap();
        let result = agreement.sign(PartyRole::Tenant, first + Duration::hours(1));

        assert!(matches!(
            result,
            Err(AgreementError::InvalidTransition { .. })
        ));
        assert_eq!(agreement.signed_at(PartyRole::Tenant), Some(first));
        assert_eq!(agreement.status_name(), "pending_signatures");
    }

    #[test]
    fn test_sign_after_withdrawal_fails() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement
            .withdraw_offer("unit no longer available", test_now())
            .unwrap();
        let result = agreement.sign(PartyRole::Tenant, test_now());

        assert!(matches!(
            result,
            Err(AgreementError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_sign_emits_events() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        agreement.take_events();

        agreement.sign(PartyRole::Landlord, test_now()).unwrap();
        agreement
            .sign(PartyRole::Tenant, test_now() + Duration::hours(1))
            .unwrap();

        let events = agreement.take_events();
        let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec!["AgreementSigned", "AgreementSigned", "AgreementFullySigned"]
        );
    }
}

// ============================================================================
// Withdrawal
// ============================================================================

mod withdrawal {
    use super::*;

    #[test]
    fn test_landlord_withdraws_before_tenant_signs() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement
            .withdraw_offer("unit no longer available", test_now())
            .unwrap();

        match agreement.state() {
            AgreementState::Withdrawn { by, reason, .. } => {
                assert_eq!(*by, PartyRole::Landlord);
                assert_eq!(reason, "unit no longer available");
            }
            other => panic!("Expected Withdrawn, got {:?}", other),
        }
    }

    #[test]
    fn test_landlord_can_withdraw_after_own_signature() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement.sign(PartyRole::Landlord, test_now()).unwrap();
        assert!(agreement.can_withdraw(PartyRole::Landlord));
        agreement
            .withdraw_offer("changed plans", test_now() + Duration::hours(1))
            .unwrap();

        assert_eq!(agreement.status_name(), "withdrawn");
    }

    #[test]
    fn test_landlord_cannot_withdraw_once_tenant_signed() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement.sign(PartyRole::Tenant, test_now()).unwrap();
        assert!(!agreement.can_withdraw(PartyRole::Landlord));

        let result = agreement.withdraw_offer("too late", test_now());
        assert!(matches!(
            result,
            Err(AgreementError::WithdrawalNotAllowed {
                other_party: PartyRole::Tenant
            })
        ));
        assert_eq!(agreement.status_name(), "pending_signatures");
    }

    #[test]
    fn test_tenant_withdrawal_is_symmetric() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement.sign(PartyRole::Landlord, test_now()).unwrap();
        let result = agreement.withdraw_signature("found another place", test_now());

        assert!(matches!(
            result,
            Err(AgreementError::WithdrawalNotAllowed {
                other_party: PartyRole::Landlord
            })
        ));
    }

    #[test]
    fn test_no_withdrawal_after_both_signed() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement.sign(PartyRole::Landlord, test_now()).unwrap();
        agreement.sign(PartyRole::Tenant, test_now()).unwrap();

        assert!(!agreement.can_withdraw(PartyRole::Landlord));
        assert!(!agreement.can_withdraw(PartyRole::Tenant));
        assert!(agreement.withdraw_offer("no", test_now()).is_err());
        assert!(agreement.withdraw_signature("no", test_now()).is_err());
    }
}

// ============================================================================
// Payment stages and activation
// ============================================================================

mod payment {
    use super::*;

    fn fully_signed() -> (TenancyAgreement, DateTime<Utc>) {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        let now = test_now();
        agreement.sign(PartyRole::Landlord, now).unwrap();
        agreement.sign(PartyRole::Tenant, now).unwrap();
        (agreement, now)
    }

    #[test]
    fn test_fee_payment_advances_and_resets_deadline() {
        let (mut agreement, now) = fully_signed();
        let paid_at = now + Duration::hours(2);

        agreement.record_fee_paid(&success(), paid_at).unwrap();

        assert_eq!(agreement.status_name(), "website_fee_paid");
        assert_eq!(
            agreement.expires_at(),
            Some(paid_at + Duration::hours(DEPOSIT_PAYMENT_WINDOW_HOURS))
        );
    }

    #[test]
    fn test_fee_payment_requires_pending_payment() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        let result = agreement.record_fee_paid(&success(), test_now());
        assert!(matches!(
            result,
            Err(AgreementError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_failed_charge_leaves_state_untouched() {
        let (mut agreement, now) = fully_signed();
        let failure = PaymentOutcome::Failure {
            reason: "card declined".to_string(),
        };

        let before = agreement.state().clone();
        let result = agreement.record_fee_paid(&failure, now + Duration::hours(1));

        assert!(matches!(result, Err(AgreementError::GatewayFailure { .. })));
        assert_eq!(agreement.state(), &before);
    }

    #[test]
    fn test_activation_from_fee_paid() {
        let (mut agreement, now) = fully_signed();
        agreement
            .record_fee_paid(&success(), now + Duration::hours(1))
            .unwrap();

        let deposit_id = DepositId::new_v7();
        agreement
            .activate(&success(), deposit_id, now + Duration::hours(2))
            .unwrap();

        assert!(agreement.is_active());
        match agreement.state() {
            AgreementState::Active {
                deposit_id: linked, ..
            } => assert_eq!(*linked, deposit_id),
            other => panic!("Expected Active, got {:?}", other),
        }
        assert_eq!(agreement.expires_at(), None);
        assert_eq!(agreement.countdown(now), None);
    }

    #[test]
    fn test_activation_requires_fee_paid() {
        let (mut agreement, now) = fully_signed();

        let result = agreement.activate(&success(), DepositId::new(), now);
        assert!(matches!(
            result,
            Err(AgreementError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_failed_deposit_charge_stays_in_fee_paid() {
        let (mut agreement, now) = fully_signed();
        agreement
            .record_fee_paid(&success(), now + Duration::hours(1))
            .unwrap();

        let failure = PaymentOutcome::Failure {
            reason: "gateway timeout".to_string(),
        };
        let result = agreement.activate(&failure, DepositId::new(), now + Duration::hours(2));

        assert!(matches!(result, Err(AgreementError::GatewayFailure { .. })));
        assert_eq!(agreement.status_name(), "website_fee_paid");
    }
}

// ============================================================================
// Expiry
// ============================================================================

mod expiry {
    use super::*;

    #[test]
    fn test_countdown_renders_remaining_time() {
        let agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        let now = test_now() + Duration::hours(70);

        let countdown = agreement.countdown(now).unwrap();
        assert_eq!(countdown.hours, 2);
        assert!(!countdown.is_elapsed());
    }

    #[test]
    fn test_sweep_ignores_agreements_within_deadline() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        assert!(!agreement.sweep_expire(test_now() + Duration::hours(1)));
        assert_eq!(agreement.status_name(), "pending_signatures");
    }

    #[test]
    fn test_sweep_expires_regardless_of_partial_signatures() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        agreement.sign(PartyRole::Landlord, test_now()).unwrap();

        let late = test_now() + Duration::hours(SIGNATURE_WINDOW_HOURS);
        assert!(agreement.sweep_expire(late));
        assert_eq!(agreement.status_name(), "expired");
    }

    #[test]
    fn test_sweep_never_touches_active_agreements() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        let now = test_now();
        agreement.sign(PartyRole::Landlord, now).unwrap();
        agreement.sign(PartyRole::Tenant, now).unwrap();
        agreement.record_fee_paid(&success(), now).unwrap();
        agreement.activate(&success(), DepositId::new(), now).unwrap();

        assert!(!agreement.sweep_expire(now + Duration::days(365)));
        assert!(agreement.is_active());
    }

    #[test]
    fn test_payment_past_deadline_fails_with_expired() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        let now = test_now();
        agreement.sign(PartyRole::Landlord, now).unwrap();
        agreement.sign(PartyRole::Tenant, now).unwrap();

        let late = now + Duration::hours(FEE_PAYMENT_WINDOW_HOURS + 1);
        let result = agreement.record_fee_paid(&success(), late);

        assert!(matches!(result, Err(AgreementError::AgreementExpired { .. })));
    }

    #[test]
    fn test_expired_event_records_missed_deadline() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        agreement.take_events();

        let deadline = agreement.expires_at().unwrap();
        agreement.sweep_expire(deadline + Duration::minutes(5));

        let events = agreement.take_events();
        match &events[0] {
            AgreementEvent::Expired { deadline: d, .. } => assert_eq!(*d, deadline),
            other => panic!("Expected Expired event, got {:?}", other),
        }
    }
}

// ============================================================================
// Cancellation
// ============================================================================

mod cancellation {
    use super::*;

    #[test]
    fn test_cancel_from_any_non_terminal_state() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));
        agreement.sign(PartyRole::Landlord, test_now()).unwrap();
        agreement.sign(PartyRole::Tenant, test_now()).unwrap();

        agreement.cancel("listing removed", test_now()).unwrap();
        assert_eq!(agreement.status_name(), "cancelled");
    }

    #[test]
    fn test_cancel_twice_fails() {
        let mut agreement = create_agreement(Money::new(dec!(2000), Currency::USD));

        agreement.cancel("first", test_now()).unwrap();
        assert!(agreement.cancel("second", test_now()).is_err());
    }
}
