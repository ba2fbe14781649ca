//! Service-level tests for the billing reconciliation engine

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{Money, StudentId};
use domain_billing::{
    BillingError, BillingService, CreateInvoice, InvoiceItem, InvoiceQuery, InvoiceStatus,
    PaymentMethod, Period, RecordPayment,
};
use test_utils::{
    FailingRenderer, InMemoryBillingStore, InMemoryStudentDirectory, RecordingRenderer,
    StudentFixtures, TestInvoiceBuilder,
};

struct Harness {
    store: Arc<InMemoryBillingStore>,
    students: Arc<InMemoryStudentDirectory>,
    service: BillingService,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryBillingStore::new());
    let students = Arc::new(InMemoryStudentDirectory::new());
    let service = BillingService::new(
        store.clone(),
        students.clone(),
        Arc::new(RecordingRenderer::new()),
    );
    Harness {
        store,
        students,
        service,
    }
}

fn payment(student_id: StudentId, amount: Money) -> RecordPayment {
    RecordPayment {
        student_id,
        amount,
        payment_date: None,
        method: PaymentMethod::Cash,
        description: None,
        invoice_id: None,
        recorded_by: None,
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

mod reconciliation_tests {
    use super::*;

    #[tokio::test]
    async fn partial_then_paid() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());
        let invoice = TestInvoiceBuilder::new()
            .with_student(student_id)
            .with_total(Money::rupees(dec!(1000)))
            .build();
        let invoice_id = invoice.id;
        h.store.seed_invoice(invoice);

        let applied = h
            .service
            .record_payment(RecordPayment {
                invoice_id: Some(invoice_id),
                ..payment(student_id, Money::rupees(dec!(400)))
            })
            .await
            .unwrap();
        assert_eq!(applied.invoice.unwrap().status, InvoiceStatus::Partial);

        let applied = h
            .service
            .record_payment(RecordPayment {
                invoice_id: Some(invoice_id),
                ..payment(student_id, Money::rupees(dec!(600)))
            })
            .await
            .unwrap();
        assert_eq!(applied.invoice.unwrap().status, InvoiceStatus::Paid);

        let (_, payments) = h.service.invoice_with_payments(invoice_id).await.unwrap();
        assert_eq!(payments.len(), 2);
    }

    #[tokio::test]
    async fn overpayment_marks_paid() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());
        let invoice = TestInvoiceBuilder::new()
            .with_student(student_id)
            .with_total(Money::rupees(dec!(500)))
            .build();
        let invoice_id = invoice.id;
        h.store.seed_invoice(invoice);

        let applied = h
            .service
            .record_payment(RecordPayment {
                invoice_id: Some(invoice_id),
                ..payment(student_id, Money::rupees(dec!(700)))
            })
            .await
            .unwrap();

        assert_eq!(applied.invoice.unwrap().status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn cancelled_invoice_stays_cancelled() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());
        let invoice = TestInvoiceBuilder::new()
            .with_student(student_id)
            .with_status(InvoiceStatus::Cancelled)
            .with_total(Money::rupees(dec!(1000)))
            .build();
        let invoice_id = invoice.id;
        h.store.seed_invoice(invoice);

        let applied = h
            .service
            .record_payment(RecordPayment {
                invoice_id: Some(invoice_id),
                ..payment(student_id, Money::rupees(dec!(1000)))
            })
            .await
            .unwrap();

        // The payment persists, but the cancelled status is untouched.
        assert_eq!(applied.invoice.unwrap().status, InvoiceStatus::Cancelled);
        assert_eq!(h.store.payment_count(), 1);
    }

    #[tokio::test]
    async fn payment_with_dangling_invoice_reference_still_persists() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());

        let applied = h
            .service
            .record_payment(RecordPayment {
                invoice_id: Some(core_kernel::InvoiceId::new()),
                ..payment(student_id, Money::rupees(dec!(100)))
            })
            .await
            .unwrap();

        assert!(applied.invoice.is_none());
        assert_eq!(h.store.payment_count(), 1);
    }
}

// ============================================================================
// Guards
// ============================================================================

mod guard_tests {
    use super::*;

    #[tokio::test]
    async fn unknown_student_is_rejected_and_nothing_persists() {
        let h = harness();

        let result = h
            .service
            .record_payment(payment(
                StudentFixtures::unknown_id(),
                Money::rupees(dec!(100)),
            ))
            .await;

        assert!(matches!(result, Err(BillingError::StudentNotFound(_))));
        assert_eq!(h.store.payment_count(), 0);
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());

        let result = h
            .service
            .record_payment(payment(student_id, Money::rupees(dec!(-5))))
            .await;

        assert!(matches!(result, Err(BillingError::InvalidAmount(_))));
        assert_eq!(h.store.payment_count(), 0);
    }

    #[tokio::test]
    async fn zero_amount_is_accepted() {
        // Validation is >= 0, mirroring the enrollment office's habit of
        // recording waived fees as zero payments.
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());

        let applied = h
            .service
            .record_payment(payment(student_id, Money::rupees(dec!(0))))
            .await
            .unwrap();

        assert!(applied.payment.amount.is_zero());
    }
}

// ============================================================================
// Student financials
// ============================================================================

mod financials_tests {
    use super::*;

    #[tokio::test]
    async fn outstanding_spans_unattached_payments() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());
        h.store.seed_invoice(
            TestInvoiceBuilder::new()
                .with_number("INV-000001-001")
                .with_student(student_id)
                .with_total(Money::rupees(dec!(500)))
                .build(),
        );
        h.store.seed_invoice(
            TestInvoiceBuilder::new()
                .with_number("INV-000001-002")
                .with_student(student_id)
                .with_total(Money::rupees(dec!(300)))
                .build(),
        );
        h.service
            .record_payment(payment(student_id, Money::rupees(dec!(200))))
            .await
            .unwrap();

        let summary = h.service.student_financials(student_id).await.unwrap();

        assert_eq!(summary.total_invoiced.amount(), dec!(800));
        assert_eq!(summary.total_paid.amount(), dec!(200));
        assert_eq!(summary.outstanding.amount(), dec!(600));
    }

    #[tokio::test]
    async fn financials_are_idempotent_between_writes() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());
        h.store.seed_invoice(
            TestInvoiceBuilder::new()
                .with_student(student_id)
                .with_total(Money::rupees(dec!(500)))
                .build(),
        );

        let first = h.service.student_financials(student_id).await.unwrap();
        let second = h.service.student_financials(student_id).await.unwrap();

        assert_eq!(first.total_invoiced, second.total_invoiced);
        assert_eq!(first.total_paid, second.total_paid);
        assert_eq!(first.outstanding, second.outstanding);
    }

    #[tokio::test]
    async fn overpaid_student_has_negative_outstanding() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());
        h.store.seed_invoice(
            TestInvoiceBuilder::new()
                .with_student(student_id)
                .with_total(Money::rupees(dec!(500)))
                .build(),
        );
        h.service
            .record_payment(payment(student_id, Money::rupees(dec!(700))))
            .await
            .unwrap();

        let summary = h.service.student_financials(student_id).await.unwrap();
        assert_eq!(summary.outstanding.amount(), dec!(-200));
    }

    #[tokio::test]
    async fn unknown_student_has_no_financials() {
        let h = harness();
        let result = h
            .service
            .student_financials(StudentFixtures::unknown_id())
            .await;
        assert!(matches!(result, Err(BillingError::StudentNotFound(_))));
    }
}

// ============================================================================
// Invoice creation
// ============================================================================

mod invoice_creation_tests {
    use super::*;

    #[tokio::test]
    async fn creates_pending_invoice_with_rendered_document() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());

        let invoice = h
            .service
            .create_invoice(CreateInvoice {
                student_id,
                items: vec![
                    InvoiceItem::new("Basic driving course", Money::rupees(dec!(400)))
                        .with_quantity(dec!(2)),
                ],
                total_amount: None,
                due_date: None,
            })
            .await
            .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.total_amount.amount(), dec!(800));
        assert!(invoice.invoice_number.starts_with("INV-"));
        assert!(invoice.pdf_path.is_some());
    }

    #[tokio::test]
    async fn renderer_failure_is_not_fatal() {
        let store = Arc::new(InMemoryBillingStore::new());
        let students = Arc::new(InMemoryStudentDirectory::new());
        let service = BillingService::new(
            store.clone(),
            students.clone(),
            Arc::new(FailingRenderer::default()),
        );
        let student_id = students.seed_student(StudentFixtures::active());

        let invoice = service
            .create_invoice(CreateInvoice {
                student_id,
                items: vec![],
                total_amount: Some(Money::rupees(dec!(1000))),
                due_date: None,
            })
            .await
            .unwrap();

        assert!(invoice.pdf_path.is_none());
        // The invoice write stands.
        let listed = service.list_invoices(InvoiceQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn generated_numbers_do_not_collide() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());

        let mut numbers = std::collections::HashSet::new();
        for _ in 0..25 {
            let invoice = h
                .service
                .create_invoice(CreateInvoice {
                    student_id,
                    items: vec![],
                    total_amount: Some(Money::rupees(dec!(100))),
                    due_date: None,
                })
                .await
                .unwrap();
            assert!(numbers.insert(invoice.invoice_number));
        }
    }

    #[tokio::test]
    async fn unknown_student_cannot_be_invoiced() {
        let h = harness();
        let result = h
            .service
            .create_invoice(CreateInvoice {
                student_id: StudentFixtures::unknown_id(),
                items: vec![],
                total_amount: Some(Money::rupees(dec!(100))),
                due_date: None,
            })
            .await;

        assert!(matches!(result, Err(BillingError::StudentNotFound(_))));
    }
}

// ============================================================================
// Reports
// ============================================================================

mod report_tests {
    use super::*;

    #[tokio::test]
    async fn report_totals_and_floored_outstanding() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());

        let covered = TestInvoiceBuilder::new()
            .with_number("INV-000002-001")
            .with_student(student_id)
            .with_total(Money::rupees(dec!(500)))
            .build();
        let covered_id = covered.id;
        h.store.seed_invoice(covered);
        h.store.seed_invoice(
            TestInvoiceBuilder::new()
                .with_number("INV-000002-002")
                .with_student(student_id)
                .with_total(Money::rupees(dec!(300)))
                .build(),
        );

        // Overpay the first invoice; its excess must not offset the second.
        h.service
            .record_payment(RecordPayment {
                invoice_id: Some(covered_id),
                ..payment(student_id, Money::rupees(dec!(600)))
            })
            .await
            .unwrap();

        let report = h.service.financial_report(Period::default()).await.unwrap();

        assert_eq!(report.total_invoiced.amount(), dec!(800));
        assert_eq!(report.total_revenue.amount(), dec!(600));
        assert_eq!(report.outstanding.amount(), dec!(300));
        assert_eq!(report.recent_payments.len(), 1);
        assert_eq!(report.payments_by_method.len(), 1);
        assert_eq!(report.payments_by_method[0].count, 1);
    }

    #[tokio::test]
    async fn paid_sums_are_grouped_per_invoice_in_one_lookup() {
        use domain_billing::BillingStore;

        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());

        let first = TestInvoiceBuilder::new()
            .with_number("INV-000003-001")
            .with_student(student_id)
            .with_total(Money::rupees(dec!(500)))
            .build();
        let second = TestInvoiceBuilder::new()
            .with_number("INV-000003-002")
            .with_student(student_id)
            .with_total(Money::rupees(dec!(300)))
            .build();
        let (first_id, second_id) = (first.id, second.id);
        h.store.seed_invoice(first);
        h.store.seed_invoice(second);

        for (invoice_id, amount) in [
            (first_id, dec!(200)),
            (first_id, dec!(100)),
            (second_id, dec!(300)),
        ] {
            h.service
                .record_payment(RecordPayment {
                    invoice_id: Some(invoice_id),
                    ..payment(student_id, Money::rupees(amount))
                })
                .await
                .unwrap();
        }

        let unpaid_id = core_kernel::InvoiceId::new();
        let totals = h
            .store
            .paid_totals(&[first_id, second_id, unpaid_id])
            .await
            .unwrap();

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&first_id].amount(), dec!(300));
        assert_eq!(totals[&second_id].amount(), dec!(300));
        assert!(!totals.contains_key(&unpaid_id));
    }

    #[tokio::test]
    async fn explicit_cancellation_then_reconciliation_respects_it() {
        let h = harness();
        let student_id = h.students.seed_student(StudentFixtures::active());
        let invoice = TestInvoiceBuilder::new()
            .with_student(student_id)
            .with_total(Money::rupees(dec!(1000)))
            .build();
        let invoice_id = invoice.id;
        h.store.seed_invoice(invoice);

        let cancelled = h
            .service
            .update_invoice_status(invoice_id, InvoiceStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled);

        let applied = h
            .service
            .record_payment(RecordPayment {
                invoice_id: Some(invoice_id),
                ..payment(student_id, Money::rupees(dec!(1000)))
            })
            .await
            .unwrap();
        assert_eq!(applied.invoice.unwrap().status, InvoiceStatus::Cancelled);
    }
}
