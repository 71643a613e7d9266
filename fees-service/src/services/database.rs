//! Database service for fees-service.

use crate::models::{
    compute_obligation, payment_totals, receipt_period, AcademicYear, ClassBreakdown,
    CollectionSummary, Defaulter, FeeConcession, FeePayment, FeeStatus, FeeStatusSummary,
    FeeStructure, FeeTypeBreakdown, ListPaymentsFilter, ModeBreakdown, MonthlyBucket,
    MonthlyCollection, PaymentMode, PaymentRecord, RecordPayment, ReportFilter,
    StructureFeeStatus, StudentSummary,
};
use crate::services::metrics::{DB_QUERY_DURATION, PAYMENTS_RECORDED};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "fees-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Collaborator Lookups (students, classes, academic years)
    // -------------------------------------------------------------------------

    /// Get a student joined with their class name.
    #[instrument(skip(self), fields(student_id = %student_id))]
    pub async fn get_student_summary(
        &self,
        student_id: Uuid,
    ) -> Result<Option<StudentSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_student_summary"])
            .start_timer();

        let student = sqlx::query_as::<_, StudentSummary>(
            r#"
            SELECT s.student_id, s.admission_no, s.full_name, s.class_id, c.name AS class_name, s.active
            FROM students s
            JOIN school_classes c ON c.class_id = s.class_id
            WHERE s.student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get student: {}", e)))?;

        timer.observe_duration();

        Ok(student)
    }

    /// List all active students with their class names.
    #[instrument(skip(self))]
    pub async fn list_active_students(&self) -> Result<Vec<StudentSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_active_students"])
            .start_timer();

        let students = sqlx::query_as::<_, StudentSummary>(
            r#"
            SELECT s.student_id, s.admission_no, s.full_name, s.class_id, c.name AS class_name, s.active
            FROM students s
            JOIN school_classes c ON c.class_id = s.class_id
            WHERE s.active = TRUE
            ORDER BY s.admission_no
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list students: {}", e)))?;

        timer.observe_duration();

        Ok(students)
    }

    /// Get the academic year currently in effect.
    #[instrument(skip(self))]
    pub async fn get_current_academic_year(&self) -> Result<Option<AcademicYear>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_current_academic_year"])
            .start_timer();

        let year = sqlx::query_as::<_, AcademicYear>(
            r#"
            SELECT academic_year_id, name, starts_on, ends_on, is_current, created_utc
            FROM academic_years
            WHERE is_current = TRUE
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get academic year: {}", e))
        })?;

        timer.observe_duration();

        Ok(year)
    }

    // -------------------------------------------------------------------------
    // Fee Structure Resolution
    // -------------------------------------------------------------------------

    /// Resolve every structure applying to a class in an academic year:
    /// class-bound structures for that class plus global (NULL class) ones.
    #[instrument(skip(self), fields(academic_year_id = %academic_year_id, class_id = %class_id))]
    pub async fn resolve_structures(
        &self,
        academic_year_id: Uuid,
        class_id: Uuid,
    ) -> Result<Vec<FeeStructure>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["resolve_structures"])
            .start_timer();

        let structures = sqlx::query_as::<_, FeeStructure>(
            r#"
            SELECT structure_id, academic_year_id, class_id, fee_type, base_amount, frequency, created_utc
            FROM fee_structures
            WHERE academic_year_id = $1
              AND (class_id = $2 OR class_id IS NULL)
            ORDER BY fee_type, structure_id
            "#,
        )
        .bind(academic_year_id)
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to resolve structures: {}", e))
        })?;

        timer.observe_duration();

        Ok(structures)
    }

    /// Get one structure by ID.
    #[instrument(skip(self), fields(structure_id = %structure_id))]
    pub async fn get_structure(
        &self,
        structure_id: Uuid,
    ) -> Result<Option<FeeStructure>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_structure"])
            .start_timer();

        let structure = sqlx::query_as::<_, FeeStructure>(
            r#"
            SELECT structure_id, academic_year_id, class_id, fee_type, base_amount, frequency, created_utc
            FROM fee_structures
            WHERE structure_id = $1
            "#,
        )
        .bind(structure_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get structure: {}", e)))?;

        timer.observe_duration();

        Ok(structure)
    }

    // -------------------------------------------------------------------------
    // Concession Resolution
    // -------------------------------------------------------------------------

    /// Resolve the concession in effect for a (student, structure) pair.
    /// When overlapping windows exist the most recently created one wins.
    #[instrument(skip(self), fields(student_id = %student_id, structure_id = %structure_id))]
    pub async fn resolve_concession(
        &self,
        student_id: Uuid,
        structure_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Option<FeeConcession>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["resolve_concession"])
            .start_timer();

        let concession = sqlx::query_as::<_, FeeConcession>(
            r#"
            SELECT concession_id, student_id, structure_id, percentage, amount, valid_from, valid_to, created_utc
            FROM fee_concessions
            WHERE student_id = $1
              AND structure_id = $2
              AND valid_from <= $3
              AND valid_to >= $3
            ORDER BY created_utc DESC
            LIMIT 1
            "#,
        )
        .bind(student_id)
        .bind(structure_id)
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to resolve concession: {}", e))
        })?;

        timer.observe_duration();

        Ok(concession)
    }

    // -------------------------------------------------------------------------
    // Payment Ledger
    // -------------------------------------------------------------------------

    /// Record a payment. The receipt number is allocated by the
    /// `next_fee_receipt_number` counter function inside the INSERT itself,
    /// so allocation and insert commit (or roll back) together and two
    /// concurrent payments can never draw the same number.
    #[instrument(skip(self, input), fields(student_id = %input.student_id, structure_id = %input.structure_id))]
    pub async fn record_payment(&self, input: &RecordPayment) -> Result<FeePayment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_payment"])
            .start_timer();

        let period = receipt_period(&input.for_month).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!(
                "for_month must be a YYYY-MM month, got '{}'",
                input.for_month
            ))
        })?;

        let student = self.get_student_summary(input.student_id).await?;
        if student.is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!("Student not found")));
        }

        let structure = self.get_structure(input.structure_id).await?;
        if structure.is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Fee structure not found"
            )));
        }

        let totals = payment_totals(
            input.amount,
            input.discount,
            input.late_fee,
            input.paid_amount,
        );
        if totals.total_amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Discount {} leaves nothing to pay against amount {} plus late fee {}",
                input.discount,
                input.amount,
                input.late_fee
            )));
        }

        let payment_id = Uuid::new_v4();
        let payment = sqlx::query_as::<_, FeePayment>(
            r#"
            INSERT INTO fee_payments (
                payment_id, receipt_number, student_id, structure_id, amount, discount, late_fee,
                total_amount, paid_amount, due_amount, payment_mode, status, payment_date,
                for_month, transaction_id, remarks
            )
            VALUES ($1, next_fee_receipt_number($2), $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING payment_id, receipt_number, student_id, structure_id, amount, discount, late_fee,
                total_amount, paid_amount, due_amount, payment_mode, status, payment_date,
                for_month, transaction_id, remarks, created_utc
            "#,
        )
        .bind(payment_id)
        .bind(&period)
        .bind(input.student_id)
        .bind(input.structure_id)
        .bind(input.amount)
        .bind(input.discount)
        .bind(input.late_fee)
        .bind(totals.total_amount)
        .bind(input.paid_amount)
        .bind(totals.due_amount)
        .bind(input.payment_mode.as_str())
        .bind(totals.status.as_str())
        .bind(input.payment_date)
        .bind(&input.for_month)
        .bind(&input.transaction_id)
        .bind(&input.remarks)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Receipt number already allocated"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to record payment: {}", e)),
        })?;

        PAYMENTS_RECORDED
            .with_label_values(&[totals.status.as_str()])
            .inc();

        timer.observe_duration();

        info!(
            payment_id = %payment.payment_id,
            receipt_number = %payment.receipt_number,
            paid_amount = %payment.paid_amount,
            status = %payment.status,
            "Payment recorded"
        );

        Ok(payment)
    }

    /// Sum of paid amounts against one structure for one student. Partial
    /// payments count: the money was received even if the row is pending.
    #[instrument(skip(self), fields(student_id = %student_id, structure_id = %structure_id))]
    pub async fn sum_paid(
        &self,
        student_id: Uuid,
        structure_id: Uuid,
    ) -> Result<Decimal, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["sum_paid"])
            .start_timer();

        let paid: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(paid_amount), 0)
            FROM fee_payments
            WHERE student_id = $1 AND structure_id = $2
            "#,
        )
        .bind(student_id)
        .bind(structure_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to sum payments: {}", e)))?;

        timer.observe_duration();

        Ok(paid)
    }

    /// List payments with joined student and structure summaries.
    #[instrument(skip(self, filter))]
    pub async fn list_payments(
        &self,
        filter: &ListPaymentsFilter,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_payments"])
            .start_timer();

        let payments = sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT p.payment_id, p.receipt_number, p.student_id, p.structure_id, p.amount,
                p.discount, p.late_fee, p.total_amount, p.paid_amount, p.due_amount,
                p.payment_mode, p.status, p.payment_date, p.for_month, p.transaction_id,
                p.remarks, p.created_utc,
                s.full_name AS student_name, s.admission_no, c.name AS class_name, f.fee_type
            FROM fee_payments p
            JOIN students s ON s.student_id = p.student_id
            JOIN school_classes c ON c.class_id = s.class_id
            JOIN fee_structures f ON f.structure_id = p.structure_id
            WHERE ($1::uuid IS NULL OR p.student_id = $1)
              AND ($2::varchar IS NULL OR p.status = $2)
              AND ($3::date IS NULL OR p.payment_date >= $3)
              AND ($4::date IS NULL OR p.payment_date <= $4)
            ORDER BY p.payment_date DESC, p.created_utc DESC
            "#,
        )
        .bind(filter.student_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.from_date)
        .bind(filter.to_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list payments: {}", e)))?;

        timer.observe_duration();

        Ok(payments)
    }

    /// Most recent payments for a student.
    #[instrument(skip(self), fields(student_id = %student_id))]
    pub async fn recent_payments(
        &self,
        student_id: Uuid,
        limit: i64,
    ) -> Result<Vec<FeePayment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["recent_payments"])
            .start_timer();

        let payments = sqlx::query_as::<_, FeePayment>(
            r#"
            SELECT payment_id, receipt_number, student_id, structure_id, amount, discount, late_fee,
                total_amount, paid_amount, due_amount, payment_mode, status, payment_date,
                for_month, transaction_id, remarks, created_utc
            FROM fee_payments
            WHERE student_id = $1
            ORDER BY created_utc DESC
            LIMIT $2
            "#,
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get recent payments: {}", e))
        })?;

        timer.observe_duration();

        Ok(payments)
    }

    // -------------------------------------------------------------------------
    // Fee Status Projection
    // -------------------------------------------------------------------------

    /// Per-structure statuses for one student in one academic year.
    async fn structure_statuses(
        &self,
        student: &StudentSummary,
        academic_year_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Vec<StructureFeeStatus>, AppError> {
        let structures = self
            .resolve_structures(academic_year_id, student.class_id)
            .await?;

        let mut statuses = Vec::with_capacity(structures.len());
        for structure in &structures {
            let frequency = structure.parsed_frequency().ok_or_else(|| {
                AppError::DatabaseError(anyhow::anyhow!(
                    "Structure {} has unknown billing frequency '{}'",
                    structure.structure_id,
                    structure.frequency
                ))
            })?;

            let concession = self
                .resolve_concession(student.student_id, structure.structure_id, as_of)
                .await?;
            let obligation = compute_obligation(
                structure.base_amount,
                frequency,
                concession.as_ref(),
                as_of,
            );
            let paid = self
                .sum_paid(student.student_id, structure.structure_id)
                .await?;

            statuses.push(StructureFeeStatus {
                structure_id: structure.structure_id,
                fee_type: structure.parsed_fee_type(),
                frequency,
                base_amount: structure.base_amount,
                total_amount: obligation.total_amount,
                concession_amount: obligation.concession_amount,
                net_amount: obligation.net_amount,
                paid_amount: paid,
                balance: obligation.net_amount - paid,
            });
        }

        Ok(statuses)
    }

    /// Live fee-status view for a student: per-structure obligations netted
    /// against payments, with rolled-up totals and recent payments.
    #[instrument(skip(self), fields(student_id = %student_id))]
    pub async fn get_fee_status(&self, student_id: Uuid) -> Result<FeeStatus, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_fee_status"])
            .start_timer();

        let student = self
            .get_student_summary(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Student not found")))?;

        let academic_year = self.get_current_academic_year().await?.ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("No academic year is marked current"))
        })?;

        let as_of = chrono::Utc::now().date_naive();
        let per_structure = self
            .structure_statuses(&student, academic_year.academic_year_id, as_of)
            .await?;

        let mut summary = FeeStatusSummary::default();
        for status in &per_structure {
            summary.accumulate(status);
        }

        let recent_payments = self.recent_payments(student_id, 10).await?;

        timer.observe_duration();

        Ok(FeeStatus {
            student,
            academic_year,
            per_structure,
            summary,
            recent_payments,
        })
    }

    // -------------------------------------------------------------------------
    // Reporting Aggregation
    // -------------------------------------------------------------------------

    /// Collection summary over completed payments: totals plus a per-fee-type
    /// breakdown.
    #[instrument(skip(self, filter))]
    pub async fn collection_summary(
        &self,
        filter: &ReportFilter,
    ) -> Result<CollectionSummary, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["collection_summary"])
            .start_timer();

        let (total_paid, total_discount, total_late_fee, transaction_count): (
            Decimal,
            Decimal,
            Decimal,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(p.paid_amount), 0),
                   COALESCE(SUM(p.discount), 0),
                   COALESCE(SUM(p.late_fee), 0),
                   COUNT(*)
            FROM fee_payments p
            JOIN students s ON s.student_id = p.student_id
            WHERE p.status = 'completed'
              AND ($1::date IS NULL OR p.payment_date >= $1)
              AND ($2::date IS NULL OR p.payment_date <= $2)
              AND ($3::uuid IS NULL OR s.class_id = $3)
            "#,
        )
        .bind(filter.from_date)
        .bind(filter.to_date)
        .bind(filter.class_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to build collection summary: {}", e))
        })?;

        let by_type: Vec<(String, Decimal, i64)> = sqlx::query_as(
            r#"
            SELECT f.fee_type, COALESCE(SUM(p.paid_amount), 0), COUNT(*)
            FROM fee_payments p
            JOIN students s ON s.student_id = p.student_id
            JOIN fee_structures f ON f.structure_id = p.structure_id
            WHERE p.status = 'completed'
              AND ($1::date IS NULL OR p.payment_date >= $1)
              AND ($2::date IS NULL OR p.payment_date <= $2)
              AND ($3::uuid IS NULL OR s.class_id = $3)
            GROUP BY f.fee_type
            ORDER BY f.fee_type
            "#,
        )
        .bind(filter.from_date)
        .bind(filter.to_date)
        .bind(filter.class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to build fee-type breakdown: {}", e))
        })?;

        timer.observe_duration();

        Ok(CollectionSummary {
            total_paid,
            total_discount,
            total_late_fee,
            transaction_count,
            by_fee_type: by_type
                .into_iter()
                .map(|(fee_type, paid, count)| FeeTypeBreakdown {
                    fee_type: crate::models::FeeType::from_string(&fee_type),
                    total_paid: paid,
                    transaction_count: count,
                })
                .collect(),
        })
    }

    /// Count and amount of completed payments grouped by payment mode.
    #[instrument(skip(self, filter))]
    pub async fn payment_mode_breakdown(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<ModeBreakdown>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["payment_mode_breakdown"])
            .start_timer();

        let rows: Vec<(String, Decimal, i64)> = sqlx::query_as(
            r#"
            SELECT p.payment_mode, COALESCE(SUM(p.paid_amount), 0), COUNT(*)
            FROM fee_payments p
            JOIN students s ON s.student_id = p.student_id
            WHERE p.status = 'completed'
              AND ($1::date IS NULL OR p.payment_date >= $1)
              AND ($2::date IS NULL OR p.payment_date <= $2)
              AND ($3::uuid IS NULL OR s.class_id = $3)
            GROUP BY p.payment_mode
            ORDER BY p.payment_mode
            "#,
        )
        .bind(filter.from_date)
        .bind(filter.to_date)
        .bind(filter.class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to build mode breakdown: {}", e))
        })?;

        timer.observe_duration();

        Ok(rows
            .into_iter()
            .map(|(mode, paid, count)| ModeBreakdown {
                payment_mode: PaymentMode::from_string(&mode),
                total_paid: paid,
                transaction_count: count,
            })
            .collect())
    }

    /// Count and amount of completed payments grouped by the student's class.
    #[instrument(skip(self, filter))]
    pub async fn class_wise_breakdown(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<ClassBreakdown>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["class_wise_breakdown"])
            .start_timer();

        let rows: Vec<(Uuid, String, Decimal, i64)> = sqlx::query_as(
            r#"
            SELECT c.class_id, c.name, COALESCE(SUM(p.paid_amount), 0), COUNT(*)
            FROM fee_payments p
            JOIN students s ON s.student_id = p.student_id
            JOIN school_classes c ON c.class_id = s.class_id
            WHERE p.status = 'completed'
              AND ($1::date IS NULL OR p.payment_date >= $1)
              AND ($2::date IS NULL OR p.payment_date <= $2)
            GROUP BY c.class_id, c.name
            ORDER BY c.name
            "#,
        )
        .bind(filter.from_date)
        .bind(filter.to_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to build class breakdown: {}", e))
        })?;

        timer.observe_duration();

        Ok(rows
            .into_iter()
            .map(|(class_id, class_name, paid, count)| ClassBreakdown {
                class_id,
                class_name,
                total_paid: paid,
                transaction_count: count,
            })
            .collect())
    }

    /// Jan-Dec collection series for one calendar year. Months with no
    /// payments appear as zero buckets; the series always has 12 entries.
    #[instrument(skip(self))]
    pub async fn monthly_collection(&self, year: i32) -> Result<MonthlyCollection, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["monthly_collection"])
            .start_timer();

        let rows: Vec<(i32, Decimal, i64)> = sqlx::query_as(
            r#"
            SELECT CAST(date_part('month', p.payment_date) AS int),
                   COALESCE(SUM(p.paid_amount), 0),
                   COUNT(*)
            FROM fee_payments p
            WHERE p.status = 'completed'
              AND date_part('year', p.payment_date) = $1
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(year as f64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to build monthly series: {}", e))
        })?;

        let mut months: Vec<MonthlyBucket> = (1..=12)
            .map(|month| MonthlyBucket {
                month,
                total_paid: Decimal::ZERO,
                transaction_count: 0,
            })
            .collect();
        for (month, paid, count) in rows {
            if (1..=12).contains(&month) {
                let bucket = &mut months[(month - 1) as usize];
                bucket.total_paid = paid;
                bucket.transaction_count = count;
            }
        }

        timer.observe_duration();

        Ok(MonthlyCollection { year, months })
    }

    /// Defaulter list: every active student whose net payable across all
    /// applicable structures exceeds their total paid. Exhaustive by design,
    /// O(students x structures) per call.
    #[instrument(skip(self))]
    pub async fn defaulters(&self) -> Result<Vec<Defaulter>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["defaulters"])
            .start_timer();

        let academic_year = self.get_current_academic_year().await?.ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("No academic year is marked current"))
        })?;

        let as_of = chrono::Utc::now().date_naive();
        let students = self.list_active_students().await?;

        let mut defaulters = Vec::new();
        for student in &students {
            let statuses = self
                .structure_statuses(student, academic_year.academic_year_id, as_of)
                .await?;

            let mut net_payable = Decimal::ZERO;
            let mut total_paid = Decimal::ZERO;
            for status in &statuses {
                net_payable += status.net_amount;
                total_paid += status.paid_amount;
            }

            let balance_due = net_payable - total_paid;
            if balance_due > Decimal::ZERO {
                defaulters.push(Defaulter {
                    student_id: student.student_id,
                    admission_no: student.admission_no.clone(),
                    full_name: student.full_name.clone(),
                    class_name: student.class_name.clone(),
                    net_payable,
                    total_paid,
                    balance_due,
                });
            }
        }

        timer.observe_duration();

        info!(
            student_count = students.len(),
            defaulter_count = defaulters.len(),
            "Defaulter list computed"
        );

        Ok(defaulters)
    }

    /// Current calendar year, for the monthly-collection default.
    pub fn current_year() -> i32 {
        chrono::Utc::now().year()
    }
}
