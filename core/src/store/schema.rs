//! Table metadata shared by every store backend
//!
//! Each table declares its columns, unique keys and foreign keys here. The
//! in-memory store enforces these rules directly and the MySQL backend
//! derives its DDL and column validation from the same declarations.

use std::fmt;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    /// Variable-length text with a maximum length in characters
    Text(usize),
    Bool,
    /// Fixed-point money, two decimal places
    Decimal,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

/// What happens to referencing rows when the referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    Restrict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: Table,
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Users,
    Roles,
    UserRoles,
    UserProfiles,
    Categories,
    Products,
    Orders,
    OrderItems,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column {
        name,
        kind,
        nullable: false,
    }
}

const fn opt(name: &'static str, kind: ColumnKind) -> Column {
    Column {
        name,
        kind,
        nullable: true,
    }
}

const fn fk(column: &'static str, references: Table, on_delete: OnDelete) -> ForeignKey {
    ForeignKey {
        column,
        references,
        on_delete,
    }
}

use ColumnKind::{Bool, Decimal, Int, Text, Timestamp};

const USER_COLUMNS: &[Column] = &[
    col("first_name", Text(100)),
    col("last_name", Text(100)),
    col("email", Text(255)),
    opt("phone_number", Text(20)),
    opt("password_hash", Text(255)),
    col("created_at", Timestamp),
    opt("updated_at", Timestamp),
    col("is_active", Bool),
];

const ROLE_COLUMNS: &[Column] = &[
    col("name", Text(50)),
    opt("description", Text(200)),
    col("created_at", Timestamp),
    col("is_active", Bool),
];

const USER_ROLE_COLUMNS: &[Column] = &[
    col("user_id", Int),
    col("role_id", Int),
    col("assigned_at", Timestamp),
    opt("revoked_at", Timestamp),
    col("is_active", Bool),
];

const USER_PROFILE_COLUMNS: &[Column] = &[
    col("user_id", Int),
    opt("job_title", Text(200)),
    opt("department", Text(100)),
    opt("company", Text(100)),
    opt("bio", Text(500)),
    opt("website", Text(255)),
    opt("linkedin_url", Text(255)),
    opt("twitter_url", Text(255)),
    opt("profile_image_url", Text(255)),
    opt("time_zone", Text(100)),
    opt("preferred_language", Text(10)),
    col("created_at", Timestamp),
    opt("updated_at", Timestamp),
];

const CATEGORY_COLUMNS: &[Column] = &[
    col("name", Text(100)),
    opt("description", Text(300)),
    opt("parent_category_id", Int),
    col("is_active", Bool),
    col("created_at", Timestamp),
];

const PRODUCT_COLUMNS: &[Column] = &[
    col("name", Text(200)),
    opt("description", Text(500)),
    col("price", Decimal),
    opt("sku", Text(50)),
    col("category_id", Int),
    col("stock_quantity", Int),
    col("is_active", Bool),
    col("created_at", Timestamp),
    opt("updated_at", Timestamp),
];

const ORDER_COLUMNS: &[Column] = &[
    col("order_number", Text(50)),
    col("user_id", Int),
    col("total_amount", Decimal),
    col("tax_amount", Decimal),
    col("shipping_amount", Decimal),
    col("status", Text(50)),
    opt("notes", Text(500)),
    col("order_date", Timestamp),
    opt("shipped_date", Timestamp),
    opt("delivered_date", Timestamp),
];

const ORDER_ITEM_COLUMNS: &[Column] = &[
    col("order_id", Int),
    col("product_id", Int),
    col("quantity", Int),
    col("unit_price", Decimal),
    col("total_price", Decimal),
];

impl Table {
    /// Every table, parents before the tables that reference them
    pub const ALL: [Table; 8] = [
        Table::Users,
        Table::Roles,
        Table::UserRoles,
        Table::UserProfiles,
        Table::Categories,
        Table::Products,
        Table::Orders,
        Table::OrderItems,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Roles => "roles",
            Table::UserRoles => "user_roles",
            Table::UserProfiles => "user_profiles",
            Table::Categories => "categories",
            Table::Products => "products",
            Table::Orders => "orders",
            Table::OrderItems => "order_items",
        }
    }

    /// Columns other than the `id` primary key
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Table::Users => USER_COLUMNS,
            Table::Roles => ROLE_COLUMNS,
            Table::UserRoles => USER_ROLE_COLUMNS,
            Table::UserProfiles => USER_PROFILE_COLUMNS,
            Table::Categories => CATEGORY_COLUMNS,
            Table::Products => PRODUCT_COLUMNS,
            Table::Orders => ORDER_COLUMNS,
            Table::OrderItems => ORDER_ITEM_COLUMNS,
        }
    }

    pub fn unique_keys(&self) -> &'static [&'static [&'static str]] {
        match self {
            Table::Users => &[&["email"]],
            Table::Roles => &[&["name"]],
            Table::UserRoles => &[&["user_id", "role_id"]],
            Table::UserProfiles => &[&["user_id"]],
            Table::Categories => &[&["name"]],
            Table::Products => &[&["sku"]],
            Table::Orders => &[&["order_number"]],
            Table::OrderItems => &[],
        }
    }

    pub fn foreign_keys(&self) -> &'static [ForeignKey] {
        const USER_ROLE_FKS: &[ForeignKey] = &[
            fk("user_id", Table::Users, OnDelete::Cascade),
            fk("role_id", Table::Roles, OnDelete::Cascade),
        ];
        const USER_PROFILE_FKS: &[ForeignKey] = &[fk("user_id", Table::Users, OnDelete::Cascade)];
        const CATEGORY_FKS: &[ForeignKey] =
            &[fk("parent_category_id", Table::Categories, OnDelete::Restrict)];
        const PRODUCT_FKS: &[ForeignKey] =
            &[fk("category_id", Table::Categories, OnDelete::Restrict)];
        const ORDER_FKS: &[ForeignKey] = &[fk("user_id", Table::Users, OnDelete::Restrict)];
        const ORDER_ITEM_FKS: &[ForeignKey] = &[
            fk("order_id", Table::Orders, OnDelete::Cascade),
            fk("product_id", Table::Products, OnDelete::Restrict),
        ];

        match self {
            Table::Users | Table::Roles => &[],
            Table::UserRoles => USER_ROLE_FKS,
            Table::UserProfiles => USER_PROFILE_FKS,
            Table::Categories => CATEGORY_FKS,
            Table::Products => PRODUCT_FKS,
            Table::Orders => ORDER_FKS,
            Table::OrderItems => ORDER_ITEM_FKS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// True for `id` and every declared column
    pub fn has_column(&self, name: &str) -> bool {
        name == "id" || self.column(name).is_some()
    }

    /// Foreign keys in other tables (or this one) that point at this table
    pub fn referenced_by(self) -> impl Iterator<Item = (Table, &'static ForeignKey)> {
        Table::ALL.into_iter().flat_map(move |child| {
            child
                .foreign_keys()
                .iter()
                .filter(move |fk| fk.references == self)
                .map(move |fk| (child, fk))
        })
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
