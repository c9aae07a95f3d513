// hospital-appointments/src/coordinator.rs
// ============================================================================
// Module: Appointment Coordinator
// Description: Enforces the specialty-match, no-double-booking, and
// future-date invariants against locally replicated snapshots, serializing
// conflicting writes per `(doctorId, appointmentDate)`.
// Dependencies: async-trait, dashmap, hospital-core, hospital-events,
// hospital-snapshots, time, tokio, tracing, uuid
// ============================================================================

use std::sync::Arc;

use dashmap::DashMap;
use hospital_core::ids::TenantId;
use hospital_core::specialty::specialty_matches;
use hospital_core::{Clock, EventEnvelope, EventType, HospitalError};
use hospital_events::Publisher;
use hospital_snapshots::{DoctorFacts, PatientFacts, SnapshotStore};
use time::OffsetDateTime;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::model::{Appointment, AppointmentStatus};
use crate::store::AppointmentStore;

/// Input for [`Coordinator::create`].
#[derive(Debug, Clone)]
pub struct CreateAppointmentRequest {
    pub tenant_id: TenantId,
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: OffsetDateTime,
    pub reason: Option<String>,
}

/// Input for [`Coordinator::update`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateAppointmentRequest {
    pub appointment_date: Option<OffsetDateTime>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Booking entry point. Reads patient/doctor facts from local snapshots
/// only — no synchronous cross-service calls sit on the booking path.
pub struct Coordinator {
    store: Arc<dyn AppointmentStore>,
    patients: Arc<dyn SnapshotStore<PatientFacts>>,
    doctors: Arc<dyn SnapshotStore<DoctorFacts>>,
    publisher: Arc<dyn Publisher>,
    clock: Arc<dyn Clock>,
    locks: DashMap<(String, i64), Arc<AsyncMutex<()>>>,
}

impl Coordinator {
    /// Builds a coordinator wired to its store, snapshot projections, event
    /// publisher, and clock.
    #[must_use]
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        patients: Arc<dyn SnapshotStore<PatientFacts>>,
        doctors: Arc<dyn SnapshotStore<DoctorFacts>>,
        publisher: Arc<dyn Publisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            patients,
            doctors,
            publisher,
            clock,
            locks: DashMap::new(),
        }
    }

    /// Returns the shared lock guarding writes for `(doctor_id,
    /// appointment_date)`, creating it on first use.
    fn shard_lock(&self, doctor_id: &str, appointment_date: OffsetDateTime) -> Arc<AsyncMutex<()>> {
        let key = (doctor_id.to_string(), appointment_date.unix_timestamp());
        self.locks.entry(key).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    fn require_future(&self, appointment_date: OffsetDateTime) -> Result<(), HospitalError> {
        if appointment_date <= self.clock.now() {
            return Err(HospitalError::Validation("appointment date must be in the future".to_string()));
        }
        Ok(())
    }

    async fn require_specialty_match(
        &self,
        tenant_id: &TenantId,
        patient_id: &str,
        doctor_id: &str,
    ) -> Result<(), HospitalError> {
        let patient = self
            .patients
            .get(tenant_id, patient_id)
            .await
            .ok_or_else(|| HospitalError::NotFound(format!("patient {patient_id} not found")))?;
        let doctor = self
            .doctors
            .get(tenant_id, doctor_id)
            .await
            .ok_or_else(|| HospitalError::NotFound(format!("doctor {doctor_id} not found")))?;

        if !specialty_matches(patient.disease, doctor.specialty) {
            return Err(HospitalError::Validation(format!(
                "doctor specialty {:?} does not treat disease {:?}",
                doctor.specialty, patient.disease
            )));
        }

        Ok(())
    }

    async fn publish(&self, event_type: EventType, tenant_id: &TenantId, appointment: &Appointment) {
        let payload = serde_json::json!({
            "appointmentId": appointment.id,
            "patientId": appointment.patient_id,
            "doctorId": appointment.doctor_id,
            "appointmentDate": appointment.appointment_date,
            "status": appointment.status,
        });
        let envelope = EventEnvelope::new(event_type, self.clock.now(), tenant_id.clone(), payload);
        if let Err(error) = self.publisher.publish(envelope).await {
            tracing::warn!(%error, event = event_type.routing_key(), "failed to publish appointment event");
        }
    }

    /// Books a new appointment after the specialty-match, no-double-booking,
    /// and future-date invariants all pass. Publishes `appointment.created`
    /// on success.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::NotFound`] when the patient or doctor has no
    /// local snapshot, and [`HospitalError::Validation`] for a specialty
    /// mismatch, a past appointment date, or a doctor already booked at
    /// that time.
    pub async fn create(&self, request: CreateAppointmentRequest) -> Result<Appointment, HospitalError> {
        self.require_future(request.appointment_date)?;
        self.require_specialty_match(&request.tenant_id, &request.patient_id, &request.doctor_id)
            .await?;

        let lock = self.shard_lock(&request.doctor_id, request.appointment_date);
        let _guard = lock.lock().await;

        if self
            .store
            .has_conflict(&request.tenant_id, &request.doctor_id, request.appointment_date, None)
            .await?
        {
            return Err(HospitalError::Validation(format!(
                "doctor {} already has an appointment at that time",
                request.doctor_id
            )));
        }

        let now = self.clock.now();
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            tenant_id: request.tenant_id.clone(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_date: request.appointment_date,
            status: AppointmentStatus::Pending,
            reason: request.reason,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let appointment = self.store.insert(appointment).await?;
        self.publish(EventType::AppointmentCreated, &request.tenant_id, &appointment).await;
        Ok(appointment)
    }

    /// Fetches an appointment by id.
    ///
    /// # Errors
    ///
    /// Propagates the store's lookup error.
    pub async fn get(&self, tenant_id: &TenantId, id: &str) -> Result<Option<Appointment>, HospitalError> {
        self.store.get(tenant_id, id).await
    }

    /// Lists every appointment for a patient.
    ///
    /// # Errors
    ///
    /// Propagates the store's lookup error.
    pub async fn list_by_patient(&self, tenant_id: &TenantId, patient_id: &str) -> Result<Vec<Appointment>, HospitalError> {
        self.store.list_by_patient(tenant_id, patient_id).await
    }

    /// Lists every appointment for a doctor.
    ///
    /// # Errors
    ///
    /// Propagates the store's lookup error.
    pub async fn list_by_doctor(&self, tenant_id: &TenantId, doctor_id: &str) -> Result<Vec<Appointment>, HospitalError> {
        self.store.list_by_doctor(tenant_id, doctor_id).await
    }

    /// Lists every appointment in a given status.
    ///
    /// # Errors
    ///
    /// Propagates the store's lookup error.
    pub async fn list_by_status(&self, tenant_id: &TenantId, status: AppointmentStatus) -> Result<Vec<Appointment>, HospitalError> {
        self.store.list_by_status(tenant_id, status).await
    }

    /// Lists non-cancelled appointments due within the next `hours_ahead`
    /// hours.
    ///
    /// # Errors
    ///
    /// Propagates the store's lookup error.
    pub async fn list_upcoming(&self, tenant_id: &TenantId, hours_ahead: i64) -> Result<Vec<Appointment>, HospitalError> {
        self.store.list_upcoming(tenant_id, hours_ahead, self.clock.now()).await
    }

    /// Updates an appointment's date, reason, or notes. A date change is
    /// re-checked against the future-date and no-double-booking invariants
    /// under the new slot's lock.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::NotFound`] if the appointment does not
    /// exist, and [`HospitalError::Validation`] for a past rescheduled date
    /// or a new slot that is already booked.
    pub async fn update(
        &self,
        tenant_id: &TenantId,
        id: &str,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, HospitalError> {
        let mut appointment = self
            .store
            .get(tenant_id, id)
            .await?
            .ok_or_else(|| HospitalError::NotFound(format!("appointment {id} not found")))?;

        if let Some(new_date) = request.appointment_date {
            self.require_future(new_date)?;
            let lock = self.shard_lock(&appointment.doctor_id, new_date);
            let _guard = lock.lock().await;

            if self
                .store
                .has_conflict(tenant_id, &appointment.doctor_id, new_date, Some(&appointment.id))
                .await?
            {
                return Err(HospitalError::Validation(format!(
                    "doctor {} already has an appointment at that time",
                    appointment.doctor_id
                )));
            }
            appointment.appointment_date = new_date;
        }

        if let Some(reason) = request.reason {
            appointment.reason = Some(reason);
        }
        if let Some(notes) = request.notes {
            appointment.notes = Some(notes);
        }
        appointment.updated_at = self.clock.now();

        self.store.update(appointment).await
    }

    /// Cancels an appointment, rejecting the transition if the current
    /// status cannot move to `CANCELLED`. Publishes `appointment.cancelled`
    /// on success.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::NotFound`] if the appointment does not
    /// exist, or [`HospitalError::Validation`] if it is already in a
    /// terminal state.
    pub async fn cancel(&self, tenant_id: &TenantId, id: &str) -> Result<Appointment, HospitalError> {
        let mut appointment = self
            .store
            .get(tenant_id, id)
            .await?
            .ok_or_else(|| HospitalError::NotFound(format!("appointment {id} not found")))?;

        appointment.transition_to(AppointmentStatus::Cancelled, self.clock.now())?;
        let appointment = self.store.update(appointment).await?;
        self.publish(EventType::AppointmentCancelled, tenant_id, &appointment).await;
        Ok(appointment)
    }

    /// Deletes an appointment outright (administrative hard delete, distinct
    /// from cancellation).
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::NotFound`] if the appointment does not
    /// exist.
    pub async fn delete(&self, tenant_id: &TenantId, id: &str) -> Result<(), HospitalError> {
        self.store.delete(tenant_id, id).await
    }

    /// Counts appointments in a given status.
    ///
    /// # Errors
    ///
    /// Propagates the store's lookup error.
    pub async fn count_by_status(&self, tenant_id: &TenantId, status: AppointmentStatus) -> Result<u64, HospitalError> {
        self.store.count_by_status(tenant_id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAppointmentStore;
    use hospital_core::specialty::{Disease, Specialty};
    use hospital_core::clock::FixedClock;
    use hospital_events::InProcessBroker;
    use hospital_snapshots::DashMapSnapshotStore;

    fn epoch_plus_days(days: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + time::Duration::days(days)
    }

    async fn make_coordinator() -> (
        Coordinator,
        Arc<DashMapSnapshotStore<PatientFacts>>,
        Arc<DashMapSnapshotStore<DoctorFacts>>,
        Arc<FixedClock>,
    ) {
        let store: Arc<dyn AppointmentStore> = Arc::new(InMemoryAppointmentStore::new());
        let patients = Arc::new(DashMapSnapshotStore::<PatientFacts>::new());
        let doctors = Arc::new(DashMapSnapshotStore::<DoctorFacts>::new());
        let publisher: Arc<dyn Publisher> = Arc::new(InProcessBroker::new());
        let clock = Arc::new(FixedClock::at(OffsetDateTime::UNIX_EPOCH));

        let coordinator = Coordinator::new(store, patients.clone(), doctors.clone(), publisher, clock.clone());
        (coordinator, patients, doctors, clock)
    }

    async fn seed_patient(patients: &DashMapSnapshotStore<PatientFacts>, id: &str, disease: Disease) {
        patients
            .put(
                &TenantId::new("t1"),
                id.to_string(),
                PatientFacts {
                    id: id.to_string(),
                    name: "Pat".to_string(),
                    email: "pat@example.com".to_string(),
                    phone: None,
                    gender: None,
                    disease,
                    occurred_at: OffsetDateTime::UNIX_EPOCH,
                },
            )
            .await;
    }

    async fn seed_doctor(doctors: &DashMapSnapshotStore<DoctorFacts>, id: &str, specialty: Specialty) {
        doctors
            .put(
                &TenantId::new("t1"),
                id.to_string(),
                DoctorFacts {
                    id: id.to_string(),
                    name: "Doc".to_string(),
                    email: "doc@example.com".to_string(),
                    phone: None,
                    gender: None,
                    specialty,
                    occurred_at: OffsetDateTime::UNIX_EPOCH,
                },
            )
            .await;
    }

    #[tokio::test]
    async fn books_an_appointment_when_specialty_matches() {
        let (coordinator, patients, doctors, _clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Diabetes).await;
        seed_doctor(&doctors, "d1", Specialty::Endocrinology).await;

        let appointment = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: TenantId::new("t1"),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: epoch_plus_days(1),
                reason: Some("checkup".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn rejects_specialty_mismatch() {
        let (coordinator, patients, doctors, _clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Diabetes).await;
        seed_doctor(&doctors, "d1", Specialty::Cardiology).await;

        let result = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: TenantId::new("t1"),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: epoch_plus_days(1),
                reason: None,
            })
            .await;

        assert!(matches!(result, Err(HospitalError::Validation(_))));
    }

    #[tokio::test]
    async fn a_doctor_snapshot_in_another_tenant_is_invisible() {
        let (coordinator, patients, doctors, _clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Diabetes).await;
        doctors
            .put(
                &TenantId::new("t2"),
                "d1".to_string(),
                DoctorFacts {
                    id: "d1".to_string(),
                    name: "Doc".to_string(),
                    email: "doc@example.com".to_string(),
                    phone: None,
                    gender: None,
                    specialty: Specialty::Cardiology,
                    occurred_at: OffsetDateTime::UNIX_EPOCH,
                },
            )
            .await;

        let result = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: TenantId::new("t1"),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: epoch_plus_days(1),
                reason: None,
            })
            .await;

        assert!(
            matches!(result, Err(HospitalError::NotFound(_))),
            "t1's booking must not see t2's doctor snapshot for the same id"
        );
    }

    #[tokio::test]
    async fn general_medicine_doctor_treats_any_disease() {
        let (coordinator, patients, doctors, _clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Cancer).await;
        seed_doctor(&doctors, "d1", Specialty::GeneralMedicine).await;

        let result = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: TenantId::new("t1"),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: epoch_plus_days(1),
                reason: None,
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rejects_past_appointment_dates() {
        let (coordinator, patients, doctors, clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Diabetes).await;
        seed_doctor(&doctors, "d1", Specialty::Endocrinology).await;
        clock.advance_seconds(10 * 24 * 60 * 60);

        let result = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: TenantId::new("t1"),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: epoch_plus_days(1),
                reason: None,
            })
            .await;

        assert!(matches!(result, Err(HospitalError::Validation(_))));
    }

    #[tokio::test]
    async fn double_booking_the_same_doctor_and_slot_is_rejected() {
        let (coordinator, patients, doctors, _clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Diabetes).await;
        seed_patient(&patients, "p2", Disease::Hypertension).await;
        seed_doctor(&doctors, "d1", Specialty::GeneralMedicine).await;
        let date = epoch_plus_days(1);

        coordinator
            .create(CreateAppointmentRequest {
                tenant_id: TenantId::new("t1"),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: date,
                reason: None,
            })
            .await
            .unwrap();

        let second = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: TenantId::new("t1"),
                patient_id: "p2".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: date,
                reason: None,
            })
            .await;

        assert!(matches!(second, Err(HospitalError::Validation(_))));
    }

    #[tokio::test]
    async fn cancelling_frees_the_slot_for_rebooking() {
        let (coordinator, patients, doctors, _clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Diabetes).await;
        seed_patient(&patients, "p2", Disease::Hypertension).await;
        seed_doctor(&doctors, "d1", Specialty::GeneralMedicine).await;
        let date = epoch_plus_days(1);
        let tenant = TenantId::new("t1");

        let first = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: tenant.clone(),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: date,
                reason: None,
            })
            .await
            .unwrap();

        coordinator.cancel(&tenant, &first.id).await.unwrap();

        let second = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: tenant,
                patient_id: "p2".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: date,
                reason: None,
            })
            .await;

        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn cancelling_a_completed_appointment_is_rejected() {
        let (coordinator, patients, doctors, _clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Diabetes).await;
        seed_doctor(&doctors, "d1", Specialty::GeneralMedicine).await;
        let tenant = TenantId::new("t1");

        let appointment = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: tenant.clone(),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: epoch_plus_days(1),
                reason: None,
            })
            .await
            .unwrap();

        coordinator.cancel(&tenant, &appointment.id).await.unwrap();
        let second_cancel = coordinator.cancel(&tenant, &appointment.id).await;
        assert!(matches!(second_cancel, Err(HospitalError::Validation(_))));
    }

    #[tokio::test]
    async fn rescheduling_into_an_occupied_slot_is_rejected() {
        let (coordinator, patients, doctors, _clock) = make_coordinator().await;
        seed_patient(&patients, "p1", Disease::Diabetes).await;
        seed_patient(&patients, "p2", Disease::Hypertension).await;
        seed_doctor(&doctors, "d1", Specialty::GeneralMedicine).await;
        let tenant = TenantId::new("t1");
        let slot_a = epoch_plus_days(1);
        let slot_b = epoch_plus_days(2);

        coordinator
            .create(CreateAppointmentRequest {
                tenant_id: tenant.clone(),
                patient_id: "p1".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: slot_a,
                reason: None,
            })
            .await
            .unwrap();

        let movable = coordinator
            .create(CreateAppointmentRequest {
                tenant_id: tenant.clone(),
                patient_id: "p2".to_string(),
                doctor_id: "d1".to_string(),
                appointment_date: slot_b,
                reason: None,
            })
            .await
            .unwrap();

        let result = coordinator
            .update(
                &tenant,
                &movable.id,
                UpdateAppointmentRequest {
                    appointment_date: Some(slot_a),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(HospitalError::Validation(_))));
    }
}
