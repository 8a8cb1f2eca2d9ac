use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use dispatch_cell::error::DispatchError;
use dispatch_cell::models::{
    Appointment, AppointmentStatus, CreateAppointmentRequest, PatientRef, Priority,
    Specialization,
};
use dispatch_cell::services::AppointmentQueue;

fn patient() -> PatientRef {
    PatientRef {
        id: Uuid::new_v4(),
        full_name: "Jane Roe".to_string(),
        phone: "+353 1 555 0100".to_string(),
        age: 34,
        gender: "female".to_string(),
    }
}

fn create_request(priority: Priority) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        specialization: Specialization::GeneralPractice,
        chief_complaint: "Persistent headache".to_string(),
        scheduled_at: Utc::now() + Duration::hours(3),
        priority,
        patient: patient(),
    }
}

fn pending_appointment(priority: Priority, age_minutes: i64) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        specialization: Specialization::GeneralPractice,
        chief_complaint: "Seeded complaint".to_string(),
        scheduled_at: now + Duration::hours(1),
        priority,
        status: AppointmentStatus::Pending,
        assigned_doctor_id: None,
        patient: patient(),
        created_at: now - Duration::minutes(age_minutes),
    }
}

#[tokio::test]
async fn test_create_starts_pending_and_unassigned() {
    let queue = AppointmentQueue::new();

    let appointment = queue.create(create_request(Priority::Medium)).await.unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert!(appointment.assigned_doctor_id.is_none());
}

#[tokio::test]
async fn test_create_rejects_empty_complaint() {
    let queue = AppointmentQueue::new();

    let mut request = create_request(Priority::Low);
    request.chief_complaint = "   ".to_string();

    assert_matches!(
        queue.create(request).await,
        Err(DispatchError::Validation(_))
    );
}

#[tokio::test]
async fn test_list_pending_orders_by_priority_then_fifo() {
    let queue = AppointmentQueue::new();

    let old_low = pending_appointment(Priority::Low, 60);
    let emergency = pending_appointment(Priority::Emergency, 5);
    let old_high = pending_appointment(Priority::High, 30);
    let new_high = pending_appointment(Priority::High, 10);

    queue.insert(old_low.clone()).await;
    queue.insert(emergency.clone()).await;
    queue.insert(old_high.clone()).await;
    queue.insert(new_high.clone()).await;

    let pending = queue.list_pending(None).await;

    let ids: Vec<Uuid> = pending.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![emergency.id, old_high.id, new_high.id, old_low.id]);
}

#[tokio::test]
async fn test_list_pending_filters_priority_and_status() {
    let queue = AppointmentQueue::new();

    let emergency = pending_appointment(Priority::Emergency, 5);
    let low = pending_appointment(Priority::Low, 5);
    let mut assigned = pending_appointment(Priority::Emergency, 20);
    assigned.status = AppointmentStatus::Assigned;
    assigned.assigned_doctor_id = Some(Uuid::new_v4());

    queue.insert(emergency.clone()).await;
    queue.insert(low).await;
    queue.insert(assigned).await;

    let filtered = queue.list_pending(Some(Priority::Emergency)).await;

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, emergency.id);
}

#[tokio::test]
async fn test_mark_assigned_sets_doctor_and_rejects_repeat() {
    let queue = AppointmentQueue::new();
    let appointment = pending_appointment(Priority::Medium, 0);
    let doctor_id = Uuid::new_v4();
    queue.insert(appointment.clone()).await;

    queue.mark_assigned(appointment.id, doctor_id).await.unwrap();

    let assigned = queue.get(appointment.id).await.unwrap();
    assert_eq!(assigned.status, AppointmentStatus::Assigned);
    assert_eq!(assigned.assigned_doctor_id, Some(doctor_id));

    // A second assignment attempt is a stale-caller error
    assert_matches!(
        queue.mark_assigned(appointment.id, Uuid::new_v4()).await,
        Err(DispatchError::InvalidState {
            from: AppointmentStatus::Assigned,
            to: AppointmentStatus::Assigned,
        })
    );
}

#[tokio::test]
async fn test_mark_cancelled_from_pending_releases_nothing() {
    let queue = AppointmentQueue::new();
    let appointment = pending_appointment(Priority::Low, 0);
    queue.insert(appointment.clone()).await;

    let released = queue.mark_cancelled(appointment.id).await.unwrap();

    assert_eq!(released, None);
    let cancelled = queue.get(appointment.id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_mark_cancelled_from_assigned_returns_doctor_and_clears_assignment() {
    let queue = AppointmentQueue::new();
    let appointment = pending_appointment(Priority::Low, 0);
    let doctor_id = Uuid::new_v4();
    queue.insert(appointment.clone()).await;
    queue.mark_assigned(appointment.id, doctor_id).await.unwrap();

    let released = queue.mark_cancelled(appointment.id).await.unwrap();

    assert_eq!(released, Some(doctor_id));
    let cancelled = queue.get(appointment.id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    // Cancelled never carries an assignment
    assert!(cancelled.assigned_doctor_id.is_none());
}

#[tokio::test]
async fn test_terminal_states_reject_all_transitions() {
    let queue = AppointmentQueue::new();
    let appointment = pending_appointment(Priority::Low, 0);
    queue.insert(appointment.clone()).await;
    queue.mark_cancelled(appointment.id).await.unwrap();

    assert_matches!(
        queue.mark_assigned(appointment.id, Uuid::new_v4()).await,
        Err(DispatchError::InvalidState { .. })
    );
    assert_matches!(
        queue.mark_cancelled(appointment.id).await,
        Err(DispatchError::InvalidState { .. })
    );
    assert_matches!(
        queue.mark_in_progress(appointment.id).await,
        Err(DispatchError::InvalidState { .. })
    );
}

#[tokio::test]
async fn test_revert_to_pending_only_from_assigned() {
    let queue = AppointmentQueue::new();
    let appointment = pending_appointment(Priority::High, 0);
    let doctor_id = Uuid::new_v4();
    queue.insert(appointment.clone()).await;

    assert_matches!(
        queue.revert_to_pending(appointment.id).await,
        Err(DispatchError::InvalidState { .. })
    );

    queue.mark_assigned(appointment.id, doctor_id).await.unwrap();
    let released = queue.revert_to_pending(appointment.id).await.unwrap();

    assert_eq!(released, doctor_id);
    let reverted = queue.get(appointment.id).await.unwrap();
    assert_eq!(reverted.status, AppointmentStatus::Pending);
    assert!(reverted.assigned_doctor_id.is_none());
    // Queue position is preserved for fairness
    assert_eq!(reverted.priority, appointment.priority);
    assert_eq!(reverted.created_at, appointment.created_at);
}

#[tokio::test]
async fn test_full_lifecycle_keeps_assignment_on_completion() {
    let queue = AppointmentQueue::new();
    let appointment = pending_appointment(Priority::Emergency, 0);
    let doctor_id = Uuid::new_v4();
    queue.insert(appointment.clone()).await;

    queue.mark_assigned(appointment.id, doctor_id).await.unwrap();
    queue.mark_in_progress(appointment.id).await.unwrap();
    let released = queue.mark_completed(appointment.id).await.unwrap();

    assert_eq!(released, doctor_id);
    let completed = queue.get(appointment.id).await.unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);
    // Completed records keep the doctor for traceability
    assert_eq!(completed.assigned_doctor_id, Some(doctor_id));

    // The assignment invariant holds at every stage of the lifecycle
    for stored in queue.list_all().await {
        assert_eq!(
            stored.status.holds_assignment(),
            stored.assigned_doctor_id.is_some()
        );
    }
}

#[tokio::test]
async fn test_in_progress_cannot_be_cancelled() {
    let queue = AppointmentQueue::new();
    let appointment = pending_appointment(Priority::Medium, 0);
    queue.insert(appointment.clone()).await;
    queue.mark_assigned(appointment.id, Uuid::new_v4()).await.unwrap();
    queue.mark_in_progress(appointment.id).await.unwrap();

    assert_matches!(
        queue.mark_cancelled(appointment.id).await,
        Err(DispatchError::InvalidState {
            from: AppointmentStatus::InProgress,
            to: AppointmentStatus::Cancelled,
        })
    );
}

#[tokio::test]
async fn test_unknown_appointment_not_found() {
    let queue = AppointmentQueue::new();
    let missing = Uuid::new_v4();

    assert_matches!(
        queue.get(missing).await,
        Err(DispatchError::AppointmentNotFound(id)) if id == missing
    );
}
