//! Diesel table definitions. Keep in step with `backend/migrations`.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Lowercased; unique.
        email -> Varchar,
        image -> Nullable<Text>,
        /// Argon2 PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tenants ("teams").
    organizations (id) {
        id -> Uuid,
        name -> Varchar,
        /// Unique URL-safe handle.
        slug -> Varchar,
        logo -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User to organization links; unique per pair.
    members (id) {
        id -> Uuid,
        organization_id -> Uuid,
        user_id -> Uuid,
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Blogs owned by an organization.
    sites (id) {
        id -> Varchar,
        organization_id -> Uuid,
        name -> Varchar,
        url -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(members -> organizations (organization_id));
diesel::joinable!(members -> users (user_id));
diesel::joinable!(sites -> organizations (organization_id));

diesel::allow_tables_to_appear_in_same_query!(members, organizations, sites, users);
