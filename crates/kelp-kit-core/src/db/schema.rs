//! SQLite schema definition.

/// Complete database schema for order history.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Order History (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS orders (
    record_id TEXT PRIMARY KEY,
    order_number TEXT NOT NULL UNIQUE,           -- YYYY-MMDD-NNN
    order_day TEXT NOT NULL,                     -- YYYY-MM-DD, for numbering
    customer TEXT,
    project TEXT,
    selection TEXT NOT NULL,                     -- JSON OrderSelection
    destination TEXT,                            -- JSON Destination
    requirements TEXT NOT NULL,                  -- JSON KitRequirements snapshot
    price TEXT NOT NULL,                         -- JSON PriceBreakdown
    shipping TEXT NOT NULL,                      -- JSON ShippingCharge
    total REAL NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_day ON orders(order_day);
CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at);

-- Completed orders are never rewritten
CREATE TRIGGER IF NOT EXISTS orders_no_update BEFORE UPDATE ON orders
BEGIN
    SELECT RAISE(ABORT, 'Order history is append-only');
END;

CREATE TRIGGER IF NOT EXISTS orders_no_delete BEFORE DELETE ON orders
BEGIN
    SELECT RAISE(ABORT, 'Order history is append-only');
END;
"#;
