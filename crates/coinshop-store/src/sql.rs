//! SQL statements shared by the PostgreSQL and SQLite backends.
//!
//! Placeholders use the `$N` form, which both drivers accept; a repeated
//! `$N` binds the same argument.

/// First statement of every PostgreSQL unit of work.
pub(crate) const REPEATABLE_READ: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ";

// ============================================================================
// Accounts
// ============================================================================

/// Insert a new account unless the username is taken. Returns no row on
/// conflict.
pub(crate) const INSERT_ACCOUNT_IF_ABSENT: &str = r"
    INSERT INTO accounts (username, credential_hash, balance)
    VALUES ($1, $2, $3)
    ON CONFLICT (username) DO NOTHING
    RETURNING id, username, credential_hash, balance
";

pub(crate) const SELECT_ACCOUNT_BY_ID: &str = r"
    SELECT id, username, credential_hash, balance
    FROM accounts
    WHERE id = $1
";

pub(crate) const SELECT_ACCOUNT_BY_USERNAME: &str = r"
    SELECT id, username, credential_hash, balance
    FROM accounts
    WHERE username = $1
";

pub(crate) const SELECT_ACCOUNT_ID: &str = "SELECT id FROM accounts WHERE id = $1";

pub(crate) const SELECT_ACCOUNT_ID_BY_USERNAME: &str =
    "SELECT id FROM accounts WHERE username = $1";

/// The conditional adjust: `$1` delta, `$2` account, `$3` minimum resulting
/// balance. Affects zero rows when the condition does not hold.
pub(crate) const CONDITIONAL_ADJUST: &str = r"
    UPDATE accounts
    SET balance = balance + $1
    WHERE id = $2 AND balance + $1 >= $3
";

// ============================================================================
// Catalog
// ============================================================================

pub(crate) const SELECT_ITEM_BY_NAME: &str = r"
    SELECT id, name, price
    FROM catalog_items
    WHERE name = $1
";

pub(crate) const SELECT_ITEMS: &str = r"
    SELECT id, name, price
    FROM catalog_items
    ORDER BY name
";

// ============================================================================
// Ledger records
// ============================================================================

pub(crate) const INSERT_ORDER: &str = r"
    INSERT INTO orders (owner_id, item_id)
    VALUES ($1, $2)
    RETURNING id
";

pub(crate) const INSERT_COIN_TRANSACTION: &str = r"
    INSERT INTO coin_transactions (sender_id, recipient_id, amount)
    VALUES ($1, $2, $3)
    RETURNING id
";

pub(crate) const SELECT_HOLDINGS: &str = r"
    SELECT c.name AS item, COUNT(*) AS quantity
    FROM orders o
    JOIN catalog_items c ON o.item_id = c.id
    WHERE o.owner_id = $1
    GROUP BY c.name
    ORDER BY c.name
";

pub(crate) const SELECT_TRANSFERS: &str = r"
    SELECT
        t.id,
        t.sender_id,
        t.recipient_id,
        t.amount,
        s.username AS sender_name,
        r.username AS recipient_name
    FROM coin_transactions t
    JOIN accounts s ON s.id = t.sender_id
    JOIN accounts r ON r.id = t.recipient_id
    WHERE t.sender_id = $1 OR t.recipient_id = $1
    ORDER BY t.id DESC
";
