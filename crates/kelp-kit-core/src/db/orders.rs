//! Order history database operations.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::OrderRecord;

const SELECT_ORDER: &str = r#"
    SELECT record_id, order_number, customer, project, selection, destination,
           requirements, price, shipping, created_at
    FROM orders
"#;

impl Database {
    /// Append a completed order to history.
    pub fn insert_order(&self, record: &OrderRecord) -> DbResult<()> {
        let order_day = chrono::DateTime::parse_from_rfc3339(&record.created_at)
            .map_err(|e| DbError::InvalidRecord(format!("created_at: {e}")))?
            .with_timezone(&Utc)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
        let selection_json = serde_json::to_string(&record.selection)?;
        let destination_json = record
            .destination
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let requirements_json = serde_json::to_string(&record.requirements)?;
        let price_json = serde_json::to_string(&record.price)?;
        let shipping_json = serde_json::to_string(&record.shipping)?;

        self.conn.execute(
            r#"
            INSERT INTO orders (
                record_id, order_number, order_day, customer, project, selection,
                destination, requirements, price, shipping, total, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.record_id,
                record.order_number,
                order_day,
                record.customer,
                record.project,
                selection_json,
                destination_json,
                requirements_json,
                price_json,
                shipping_json,
                record.price.total,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an order by record ID.
    pub fn get_order(&self, record_id: &str) -> DbResult<Option<OrderRecord>> {
        self.query_one(&format!("{SELECT_ORDER} WHERE record_id = ?"), record_id)
    }

    /// Get an order by its human-facing order number.
    pub fn get_order_by_number(&self, order_number: &str) -> DbResult<Option<OrderRecord>> {
        self.query_one(&format!("{SELECT_ORDER} WHERE order_number = ?"), order_number)
    }

    /// List all orders, newest first.
    pub fn list_orders(&self) -> DbResult<Vec<OrderRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_ORDER} ORDER BY created_at DESC, order_number DESC"))?;

        let rows = stmt.query_map([], OrderRow::from_row)?;

        let mut orders = Vec::new();
        for row in rows {
            orders.push(row?.try_into()?);
        }
        Ok(orders)
    }

    /// Number of orders recorded on a given day.
    pub fn count_orders_for_day(&self, day: NaiveDate) -> DbResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE order_day = ?",
            [day.format("%Y-%m-%d").to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Next order number for a day (YYYY-MMDD-NNN).
    pub fn next_order_number(&self, day: NaiveDate) -> DbResult<String> {
        let sequence = self.count_orders_for_day(day)? + 1;
        Ok(format!("{}-{:03}", day.format("%Y-%m%d"), sequence))
    }

    fn query_one(&self, sql: &str, key: &str) -> DbResult<Option<OrderRecord>> {
        self.conn
            .query_row(sql, [key], OrderRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }
}

/// Internal row representation.
struct OrderRow {
    record_id: String,
    order_number: String,
    customer: Option<String>,
    project: Option<String>,
    selection: String,
    destination: Option<String>,
    requirements: String,
    price: String,
    shipping: String,
    created_at: String,
}

impl OrderRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            record_id: row.get(0)?,
            order_number: row.get(1)?,
            customer: row.get(2)?,
            project: row.get(3)?,
            selection: row.get(4)?,
            destination: row.get(5)?,
            requirements: row.get(6)?,
            price: row.get(7)?,
            shipping: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(OrderRecord {
            record_id: row.record_id,
            order_number: row.order_number,
            customer: row.customer,
            project: row.project,
            selection: serde_json::from_str(&row.selection)?,
            destination: row
                .destination
                .map(|d| serde_json::from_str(&d))
                .transpose()?,
            requirements: serde_json::from_str(&row.requirements)?,
            price: serde_json::from_str(&row.price)?,
            shipping: serde_json::from_str(&row.shipping)?,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::KitConfig;
    use crate::configurator::KitConfigurator;
    use crate::models::{Destination, OrderSelection};

    fn make_record(order_number: &str, created_at: &str) -> OrderRecord {
        let catalog = Catalog::kelp();
        let config = KitConfig::default();
        let selection = OrderSelection::modules(["metals", "pfas"], true);
        let quoted = KitConfigurator::new(&catalog, &config)
            .quote(&selection, None)
            .unwrap();

        OrderRecord {
            record_id: uuid::Uuid::new_v4().to_string(),
            order_number: order_number.into(),
            customer: Some("ABC Water District".into()),
            project: None,
            selection,
            destination: Some(Destination::us("10001")),
            requirements: quoted.requirements,
            price: quoted.price,
            shipping: quoted.shipping,
            created_at: created_at.into(),
        }
    }

    #[test]
    fn test_insert_and_get_order() {
        let db = Database::open_in_memory().unwrap();
        let record = make_record("2025-0314-001", "2025-03-14T10:00:00Z");
        db.insert_order(&record).unwrap();

        let loaded = db.get_order(&record.record_id).unwrap().unwrap();
        assert_eq!(loaded.selection, record.selection);
        assert_eq!(loaded.destination, record.destination);
        assert_eq!(loaded.requirements.pick_list, record.requirements.pick_list);
        assert_eq!(loaded.shipping.source, record.shipping.source);
        assert!((loaded.price.total - record.price.total).abs() < 1e-9);

        let by_number = db.get_order_by_number("2025-0314-001").unwrap().unwrap();
        assert_eq!(by_number.record_id, record.record_id);
    }

    #[test]
    fn test_get_missing_order() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_order("nope").unwrap().is_none());
    }

    #[test]
    fn test_order_numbers_sequence_per_day() {
        let db = Database::open_in_memory().unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(db.next_order_number(day).unwrap(), "2025-0314-001");

        db.insert_order(&make_record("2025-0314-001", "2025-03-14T10:00:00Z"))
            .unwrap();
        db.insert_order(&make_record("2025-0314-002", "2025-03-14T11:00:00Z"))
            .unwrap();
        db.insert_order(&make_record("2025-0315-001", "2025-03-15T09:00:00Z"))
            .unwrap();

        assert_eq!(db.count_orders_for_day(day).unwrap(), 2);
        assert_eq!(db.next_order_number(day).unwrap(), "2025-0314-003");
    }

    #[test]
    fn test_order_day_uses_utc() {
        let db = Database::open_in_memory().unwrap();
        // 23:30 on the 14th in UTC-5 is already the 15th in UTC
        db.insert_order(&make_record("2025-0315-001", "2025-03-14T23:30:00-05:00"))
            .unwrap();

        let utc_day = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let local_day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(db.count_orders_for_day(utc_day).unwrap(), 1);
        assert_eq!(db.count_orders_for_day(local_day).unwrap(), 0);
        assert_eq!(db.next_order_number(utc_day).unwrap(), "2025-0315-002");
    }

    #[test]
    fn test_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_order(&make_record("2025-0314-001", "2025-03-14T10:00:00Z"))
            .unwrap();
        db.insert_order(&make_record("2025-0315-001", "2025-03-15T09:00:00Z"))
            .unwrap();

        let orders = db.list_orders().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_number, "2025-0315-001");
    }

    #[test]
    fn test_history_is_append_only() {
        let db = Database::open_in_memory().unwrap();
        db.insert_order(&make_record("2025-0314-001", "2025-03-14T10:00:00Z"))
            .unwrap();

        assert!(db.conn().execute("DELETE FROM orders", []).is_err());
        assert!(db
            .conn()
            .execute("UPDATE orders SET customer = 'x'", [])
            .is_err());
    }

    #[test]
    fn test_duplicate_order_number_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_order(&make_record("2025-0314-001", "2025-03-14T10:00:00Z"))
            .unwrap();
        assert!(db
            .insert_order(&make_record("2025-0314-001", "2025-03-14T10:05:00Z"))
            .is_err());
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let db = Database::open_in_memory().unwrap();
        let record = make_record("2025-0314-001", "yesterday");
        assert!(matches!(
            db.insert_order(&record),
            Err(DbError::InvalidRecord(_))
        ));
    }
}
