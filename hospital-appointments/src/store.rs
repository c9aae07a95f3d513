// hospital-appointments/src/store.rs
// ============================================================================
// Module: Appointment Store
// Description: Tenant-scoped persistence boundary plus the
// `(doctorId, appointmentDate)` conflict index.
// Dependencies: async-trait, dashmap, hospital-core, time
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use hospital_core::ids::TenantId;
use hospital_core::HospitalError;
use time::OffsetDateTime;

use crate::model::{Appointment, AppointmentStatus};

/// Storage boundary for appointments, implemented in-memory by
/// [`InMemoryAppointmentStore`].
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Inserts a new appointment. Callers must already hold the per-
    /// `(doctorId, appointmentDate)` lock and have checked for conflicts.
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, HospitalError>;

    /// Fetches an appointment by id, scoped to a tenant.
    async fn get(&self, tenant_id: &TenantId, id: &str) -> Result<Option<Appointment>, HospitalError>;

    /// Lists every appointment for a patient.
    async fn list_by_patient(&self, tenant_id: &TenantId, patient_id: &str) -> Result<Vec<Appointment>, HospitalError>;

    /// Lists every appointment for a doctor.
    async fn list_by_doctor(&self, tenant_id: &TenantId, doctor_id: &str) -> Result<Vec<Appointment>, HospitalError>;

    /// Lists every appointment in a given status.
    async fn list_by_status(&self, tenant_id: &TenantId, status: AppointmentStatus) -> Result<Vec<Appointment>, HospitalError>;

    /// Lists non-cancelled appointments due within the next `hours_ahead`
    /// hours of `now`.
    async fn list_upcoming(
        &self,
        tenant_id: &TenantId,
        hours_ahead: i64,
        now: OffsetDateTime,
    ) -> Result<Vec<Appointment>, HospitalError>;

    /// Replaces an already-mutated appointment record.
    async fn update(&self, appointment: Appointment) -> Result<Appointment, HospitalError>;

    /// Deletes an appointment by id.
    async fn delete(&self, tenant_id: &TenantId, id: &str) -> Result<(), HospitalError>;

    /// Counts appointments in a given status.
    async fn count_by_status(&self, tenant_id: &TenantId, status: AppointmentStatus) -> Result<u64, HospitalError>;

    /// Returns true when a non-cancelled appointment already exists for
    /// `(doctor_id, appointment_date)`, excluding `exclude_id` (used when
    /// rescheduling an existing appointment).
    async fn has_conflict(
        &self,
        tenant_id: &TenantId,
        doctor_id: &str,
        appointment_date: OffsetDateTime,
        exclude_id: Option<&str>,
    ) -> Result<bool, HospitalError>;
}

type IndexKey = (String, String, i64);

/// `DashMap`-backed rows plus a `BTreeMap` index on
/// `(tenantId, doctorId, appointmentDate)` restricted to non-cancelled rows,
/// giving the no-double-booking check an ordered, range-queryable structure.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    rows: DashMap<String, Appointment>,
    doctor_date_index: Mutex<BTreeMap<IndexKey, String>>,
}

impl InMemoryAppointmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index_key(tenant_id: &TenantId, doctor_id: &str, appointment_date: OffsetDateTime) -> IndexKey {
        (tenant_id.as_str().to_string(), doctor_id.to_string(), appointment_date.unix_timestamp())
    }

    fn reindex(&self, appointment: &Appointment) {
        let Ok(mut index) = self.doctor_date_index.lock() else { return };
        index.retain(|_, id| id != &appointment.id);
        if appointment.status != AppointmentStatus::Cancelled {
            index.insert(
                Self::index_key(&appointment.tenant_id, &appointment.doctor_id, appointment.appointment_date),
                appointment.id.clone(),
            );
        }
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, HospitalError> {
        self.rows.insert(appointment.id.clone(), appointment.clone());
        self.reindex(&appointment);
        Ok(appointment)
    }

    async fn get(&self, tenant_id: &TenantId, id: &str) -> Result<Option<Appointment>, HospitalError> {
        Ok(self
            .rows
            .get(id)
            .filter(|row| &row.tenant_id == tenant_id)
            .map(|row| row.value().clone()))
    }

    async fn list_by_patient(&self, tenant_id: &TenantId, patient_id: &str) -> Result<Vec<Appointment>, HospitalError> {
        Ok(self
            .rows
            .iter()
            .filter(|row| &row.tenant_id == tenant_id && row.patient_id == patient_id)
            .map(|row| row.value().clone())
            .collect())
    }

    async fn list_by_doctor(&self, tenant_id: &TenantId, doctor_id: &str) -> Result<Vec<Appointment>, HospitalError> {
        Ok(self
            .rows
            .iter()
            .filter(|row| &row.tenant_id == tenant_id && row.doctor_id == doctor_id)
            .map(|row| row.value().clone())
            .collect())
    }

    async fn list_by_status(&self, tenant_id: &TenantId, status: AppointmentStatus) -> Result<Vec<Appointment>, HospitalError> {
        Ok(self
            .rows
            .iter()
            .filter(|row| &row.tenant_id == tenant_id && row.status == status)
            .map(|row| row.value().clone())
            .collect())
    }

    async fn list_upcoming(
        &self,
        tenant_id: &TenantId,
        hours_ahead: i64,
        now: OffsetDateTime,
    ) -> Result<Vec<Appointment>, HospitalError> {
        let horizon = now + time::Duration::hours(hours_ahead);
        Ok(self
            .rows
            .iter()
            .filter(|row| {
                &row.tenant_id == tenant_id
                    && row.status != AppointmentStatus::Cancelled
                    && row.appointment_date >= now
                    && row.appointment_date <= horizon
            })
            .map(|row| row.value().clone())
            .collect())
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, HospitalError> {
        if !self.rows.contains_key(&appointment.id) {
            return Err(HospitalError::NotFound(format!("appointment {} not found", appointment.id)));
        }
        self.rows.insert(appointment.id.clone(), appointment.clone());
        self.reindex(&appointment);
        Ok(appointment)
    }

    async fn delete(&self, tenant_id: &TenantId, id: &str) -> Result<(), HospitalError> {
        let removed = self
            .rows
            .remove_if(id, |_, row| &row.tenant_id == tenant_id)
            .ok_or_else(|| HospitalError::NotFound(format!("appointment {id} not found")))?;
        if let Ok(mut index) = self.doctor_date_index.lock() {
            index.retain(|_, stored_id| stored_id != &removed.1.id);
        }
        Ok(())
    }

    async fn count_by_status(&self, tenant_id: &TenantId, status: AppointmentStatus) -> Result<u64, HospitalError> {
        Ok(self
            .rows
            .iter()
            .filter(|row| &row.tenant_id == tenant_id && row.status == status)
            .count() as u64)
    }

    async fn has_conflict(
        &self,
        tenant_id: &TenantId,
        doctor_id: &str,
        appointment_date: OffsetDateTime,
        exclude_id: Option<&str>,
    ) -> Result<bool, HospitalError> {
        let key = Self::index_key(tenant_id, doctor_id, appointment_date);
        let Ok(index) = self.doctor_date_index.lock() else {
            return Ok(false);
        };
        Ok(match index.get(&key) {
            Some(existing_id) => Some(existing_id.as_str()) != exclude_id,
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(id: &str, doctor_id: &str, date: OffsetDateTime, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.to_string(),
            tenant_id: TenantId::new("t1"),
            patient_id: "p1".to_string(),
            doctor_id: doctor_id.to_string(),
            appointment_date: date,
            status,
            reason: None,
            notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn detects_conflict_for_same_doctor_and_date() {
        let store = InMemoryAppointmentStore::new();
        let date = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        store
            .insert(appointment("a1", "d1", date, AppointmentStatus::Pending))
            .await
            .unwrap();

        let tenant = TenantId::new("t1");
        assert!(store.has_conflict(&tenant, "d1", date, None).await.unwrap());
        assert!(!store.has_conflict(&tenant, "d1", date, Some("a1")).await.unwrap(), "excludes itself");
    }

    #[tokio::test]
    async fn cancelled_appointments_do_not_block_rebooking() {
        let store = InMemoryAppointmentStore::new();
        let date = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        store
            .insert(appointment("a1", "d1", date, AppointmentStatus::Cancelled))
            .await
            .unwrap();

        let tenant = TenantId::new("t1");
        assert!(!store.has_conflict(&tenant, "d1", date, None).await.unwrap());
    }

    #[tokio::test]
    async fn updating_to_cancelled_frees_the_slot() {
        let store = InMemoryAppointmentStore::new();
        let date = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        let mut booked = appointment("a1", "d1", date, AppointmentStatus::Pending);
        store.insert(booked.clone()).await.unwrap();

        booked.status = AppointmentStatus::Cancelled;
        store.update(booked).await.unwrap();

        let tenant = TenantId::new("t1");
        assert!(!store.has_conflict(&tenant, "d1", date, None).await.unwrap());
    }

    #[tokio::test]
    async fn list_by_status_is_tenant_scoped() {
        let store = InMemoryAppointmentStore::new();
        let date = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        let mut other_tenant = appointment("a2", "d1", date, AppointmentStatus::Pending);
        other_tenant.tenant_id = TenantId::new("t2");
        store.insert(appointment("a1", "d1", date, AppointmentStatus::Pending)).await.unwrap();
        store.insert(other_tenant).await.unwrap();

        let rows = store
            .list_by_status(&TenantId::new("t1"), AppointmentStatus::Pending)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "a1");
    }
}
