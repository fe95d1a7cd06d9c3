// Mirrors the tables created by `repository::diesel_terms::SCHEMA_SQL`.

diesel::table! {
    attachments (id) {
        id -> BigInt,
        url -> Text,
        medium_url -> Nullable<Text>,
    }
}

diesel::table! {
    taxonomies (name) {
        name -> Text,
        label -> Text,
        public -> Bool,
    }
}

diesel::table! {
    term_meta (term_id, meta_key) {
        term_id -> BigInt,
        meta_key -> Text,
        meta_value -> Text,
    }
}

diesel::table! {
    terms (id) {
        id -> BigInt,
        taxonomy -> Text,
        name -> Text,
        slug -> Text,
        count -> BigInt,
    }
}

diesel::joinable!(term_meta -> terms (term_id));

diesel::allow_tables_to_appear_in_same_query!(attachments, taxonomies, term_meta, terms,);
