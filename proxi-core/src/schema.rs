use diesel::{allow_tables_to_appear_in_same_query, joinable, table};

table! {
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
    }
}

table! {
    notifications (id) {
        id -> Uuid,
        message -> Text,
        notif_song_id -> Varchar,
        created_at -> Nullable<Timestamptz>,
        is_view -> Bool,
        receiver_id -> Uuid,
        avatar -> Nullable<Varchar>,
    }
}

table! {
    pro_positions (id) {
        id -> Uuid,
        pro_id -> Uuid,
        latitude -> Double,
        longitude -> Double,
        timestamp -> Nullable<Timestamptz>,
    }
}

joinable!(notifications -> users (receiver_id));
joinable!(pro_positions -> users (pro_id));

allow_tables_to_appear_in_same_query!(users, notifications, pro_positions);
