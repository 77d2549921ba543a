//! Declarative schema for every entity a GTFS-JP feed can carry.
//!
//! The catalog is pure data: it names each relation, the feed file that
//! populates it, the columns it stores, the natural key it is addressed by
//! and the relations the query layer may follow. The load order is fixed so
//! parents are staged before the rows that reference them.

/// Kind of entity persisted in its own relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// `agency.txt`
    Agency,
    /// `agency_jp.txt`, the Japanese extension of an agency.
    AgencyJp,
    /// `routes.txt`
    Route,
    /// `routes_jp.txt`, the Japanese extension of a route.
    RouteJp,
    /// `trips.txt`
    Trip,
    /// `office_jp.txt`
    OfficeJp,
    /// `stops.txt`
    Stop,
    /// `stop_times.txt`
    StopTime,
    /// `calendar.txt`
    Calendar,
    /// `calendar_dates.txt`
    CalendarDate,
    /// `fare_attributes.txt`
    FareAttribute,
    /// `fare_rules.txt`
    FareRule,
    /// `shapes.txt`
    Shape,
    /// `feed_info.txt`
    FeedInfo,
    /// `translations.txt`
    Translation,
}

/// Entity kinds in the order a rebuild stages them.
pub const LOAD_ORDER: [EntityKind; 15] = [
    EntityKind::Agency,
    EntityKind::AgencyJp,
    EntityKind::Route,
    EntityKind::RouteJp,
    EntityKind::Trip,
    EntityKind::OfficeJp,
    EntityKind::Stop,
    EntityKind::StopTime,
    EntityKind::Calendar,
    EntityKind::CalendarDate,
    EntityKind::FareAttribute,
    EntityKind::FareRule,
    EntityKind::Shape,
    EntityKind::FeedInfo,
    EntityKind::Translation,
];

/// A stored column. Every value is kept as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name, identical to the feed header field.
    pub name: &'static str,
    /// Whether the column rejects absent values.
    pub required: bool,
}

const fn required(name: &'static str) -> Column {
    Column {
        name,
        required: true,
    }
}

const fn optional(name: &'static str) -> Column {
    Column {
        name,
        required: false,
    }
}

/// How many target rows a relation yields for one source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Zero or one target row keyed by the same identifier.
    OneToOne,
    /// Exactly one referenced parent, which may be missing from the feed.
    ManyToOne,
    /// Zero or more target rows.
    OneToMany,
}

/// A join the query layer may perform explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Short name of the relation, e.g. `jp`.
    pub name: &'static str,
    /// Entity on the far side of the join.
    pub target: EntityKind,
    /// `(local column, target column)` pairs joined with equality.
    pub on: &'static [(&'static str, &'static str)],
    /// Number of target rows per source row.
    pub cardinality: Cardinality,
}

/// Full declaration of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDef {
    /// Entity kind described by this declaration.
    pub kind: EntityKind,
    /// Relation name inside the store.
    pub table: &'static str,
    /// Feed file that populates the relation.
    pub file_name: &'static str,
    /// Stored columns in declaration order.
    pub columns: &'static [Column],
    /// Columns forming the natural key.
    pub natural_key: &'static [&'static str],
    /// Relations followed by the query layer.
    pub relations: &'static [Relation],
}

impl EntityDef {
    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Iterate over the column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|column| column.name)
    }
}

impl EntityKind {
    /// Return the static declaration for this kind.
    #[must_use]
    pub fn definition(self) -> &'static EntityDef {
        match self {
            Self::Agency => &AGENCY,
            Self::AgencyJp => &AGENCY_JP,
            Self::Route => &ROUTE,
            Self::RouteJp => &ROUTE_JP,
            Self::Trip => &TRIP,
            Self::OfficeJp => &OFFICE_JP,
            Self::Stop => &STOP,
            Self::StopTime => &STOP_TIME,
            Self::Calendar => &CALENDAR,
            Self::CalendarDate => &CALENDAR_DATE,
            Self::FareAttribute => &FARE_ATTRIBUTE,
            Self::FareRule => &FARE_RULE,
            Self::Shape => &SHAPE,
            Self::FeedInfo => &FEED_INFO,
            Self::Translation => &TRANSLATION,
        }
    }

    /// Relation name inside the store.
    #[must_use]
    pub fn table(self) -> &'static str {
        self.definition().table
    }

    /// Feed file populating this entity.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        self.definition().file_name
    }

    /// Resolve the entity populated by a feed file.
    ///
    /// # Examples
    /// ```
    /// use noriba_core::EntityKind;
    ///
    /// assert_eq!(EntityKind::from_file_name("stops.txt"), Some(EntityKind::Stop));
    /// assert_eq!(EntityKind::from_file_name("frequencies.txt"), None);
    /// ```
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        LOAD_ORDER
            .into_iter()
            .find(|kind| kind.file_name() == file_name)
    }
}

/// Entry point for iterating the declared entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaCatalog;

impl SchemaCatalog {
    /// Iterate the entity declarations in load order.
    pub fn entities() -> impl Iterator<Item = &'static EntityDef> {
        LOAD_ORDER.into_iter().map(EntityKind::definition)
    }
}

static AGENCY: EntityDef = EntityDef {
    kind: EntityKind::Agency,
    table: "agency",
    file_name: "agency.txt",
    columns: &[
        required("agency_id"),
        required("agency_name"),
        optional("agency_url"),
        optional("agency_timezone"),
        optional("agency_lang"),
        optional("agency_phone"),
        optional("agency_fare_url"),
        optional("agency_email"),
    ],
    natural_key: &["agency_id"],
    relations: &[Relation {
        name: "jp",
        target: EntityKind::AgencyJp,
        on: &[("agency_id", "agency_id")],
        cardinality: Cardinality::OneToOne,
    }],
};

static AGENCY_JP: EntityDef = EntityDef {
    kind: EntityKind::AgencyJp,
    table: "agency_jp",
    file_name: "agency_jp.txt",
    columns: &[
        required("agency_id"),
        optional("agency_official_name"),
        optional("agency_zip_number"),
        optional("agency_address"),
        optional("agency_president_pos"),
        optional("agency_president_name"),
    ],
    natural_key: &["agency_id"],
    relations: &[],
};

static ROUTE: EntityDef = EntityDef {
    kind: EntityKind::Route,
    table: "routes",
    file_name: "routes.txt",
    columns: &[
        required("route_id"),
        optional("agency_id"),
        optional("route_short_name"),
        optional("route_long_name"),
        optional("route_desc"),
        optional("route_type"),
        optional("route_url"),
        optional("route_color"),
        optional("route_text_color"),
        optional("jp_parent_route_id"),
    ],
    natural_key: &["route_id"],
    relations: &[
        Relation {
            name: "agency",
            target: EntityKind::Agency,
            on: &[("agency_id", "agency_id")],
            cardinality: Cardinality::ManyToOne,
        },
        Relation {
            name: "jp",
            target: EntityKind::RouteJp,
            on: &[("route_id", "route_id")],
            cardinality: Cardinality::OneToOne,
        },
    ],
};

static ROUTE_JP: EntityDef = EntityDef {
    kind: EntityKind::RouteJp,
    table: "routes_jp",
    file_name: "routes_jp.txt",
    columns: &[
        required("route_id"),
        optional("route_update_date"),
        optional("origin_stop"),
        optional("via_stop"),
        optional("destination_stop"),
    ],
    natural_key: &["route_id"],
    relations: &[],
};

static TRIP: EntityDef = EntityDef {
    kind: EntityKind::Trip,
    table: "trips",
    file_name: "trips.txt",
    columns: &[
        optional("route_id"),
        optional("service_id"),
        required("trip_id"),
        optional("trip_headsign"),
        optional("trip_short_name"),
        optional("direction_id"),
        optional("block_id"),
        optional("shape_id"),
        optional("wheelchair_accessible"),
        optional("bikes_allowed"),
        optional("jp_trip_desc"),
        optional("jp_trip_desc_symbol"),
        optional("jp_office_id"),
    ],
    natural_key: &["trip_id"],
    relations: &[
        Relation {
            name: "route",
            target: EntityKind::Route,
            on: &[("route_id", "route_id")],
            cardinality: Cardinality::ManyToOne,
        },
        Relation {
            name: "office",
            target: EntityKind::OfficeJp,
            on: &[("jp_office_id", "office_id")],
            cardinality: Cardinality::ManyToOne,
        },
    ],
};

static OFFICE_JP: EntityDef = EntityDef {
    kind: EntityKind::OfficeJp,
    table: "office_jp",
    file_name: "office_jp.txt",
    columns: &[
        required("office_id"),
        optional("office_name"),
        optional("office_url"),
        optional("office_phone"),
    ],
    natural_key: &["office_id"],
    relations: &[],
};

static STOP: EntityDef = EntityDef {
    kind: EntityKind::Stop,
    table: "stops",
    file_name: "stops.txt",
    columns: &[
        required("stop_id"),
        optional("stop_code"),
        optional("stop_name"),
        optional("stop_desc"),
        optional("stop_lat"),
        optional("stop_lon"),
        optional("zone_id"),
        optional("stop_url"),
        optional("location_type"),
        optional("parent_station"),
        optional("stop_timezone"),
        optional("wheelchair_boarding"),
        optional("platform_code"),
    ],
    natural_key: &["stop_id"],
    relations: &[
        Relation {
            name: "stop_times",
            target: EntityKind::StopTime,
            on: &[("stop_id", "stop_id")],
            cardinality: Cardinality::OneToMany,
        },
        Relation {
            name: "translations",
            target: EntityKind::Translation,
            on: &[("stop_name", "trans_id")],
            cardinality: Cardinality::OneToMany,
        },
    ],
};

static STOP_TIME: EntityDef = EntityDef {
    kind: EntityKind::StopTime,
    table: "stop_times",
    file_name: "stop_times.txt",
    columns: &[
        required("trip_id"),
        optional("arrival_time"),
        optional("departure_time"),
        required("stop_id"),
        optional("stop_sequence"),
        optional("stop_headsign"),
        optional("pickup_type"),
        optional("drop_off_type"),
        optional("shape_dist_traveled"),
        optional("timepoint"),
    ],
    natural_key: &["trip_id", "stop_sequence"],
    relations: &[
        Relation {
            name: "trip",
            target: EntityKind::Trip,
            on: &[("trip_id", "trip_id")],
            cardinality: Cardinality::ManyToOne,
        },
        Relation {
            name: "stop",
            target: EntityKind::Stop,
            on: &[("stop_id", "stop_id")],
            cardinality: Cardinality::ManyToOne,
        },
    ],
};

static CALENDAR: EntityDef = EntityDef {
    kind: EntityKind::Calendar,
    table: "calendar",
    file_name: "calendar.txt",
    columns: &[
        required("service_id"),
        optional("monday"),
        optional("tuesday"),
        optional("wednesday"),
        optional("thursday"),
        optional("friday"),
        optional("saturday"),
        optional("sunday"),
        optional("start_date"),
        optional("end_date"),
    ],
    natural_key: &["service_id"],
    relations: &[],
};

static CALENDAR_DATE: EntityDef = EntityDef {
    kind: EntityKind::CalendarDate,
    table: "calendar_dates",
    file_name: "calendar_dates.txt",
    columns: &[
        required("service_id"),
        optional("date"),
        optional("exception_type"),
    ],
    natural_key: &["service_id", "date"],
    relations: &[],
};

static FARE_ATTRIBUTE: EntityDef = EntityDef {
    kind: EntityKind::FareAttribute,
    table: "fare_attributes",
    file_name: "fare_attributes.txt",
    columns: &[
        required("fare_id"),
        optional("price"),
        optional("currency_type"),
        optional("payment_method"),
        optional("transfers"),
        optional("agency_id"),
        optional("transfer_duration"),
    ],
    natural_key: &["fare_id"],
    relations: &[],
};

static FARE_RULE: EntityDef = EntityDef {
    kind: EntityKind::FareRule,
    table: "fare_rules",
    file_name: "fare_rules.txt",
    columns: &[
        required("fare_id"),
        optional("route_id"),
        optional("origin_id"),
        optional("destination_id"),
        optional("contains_id"),
    ],
    natural_key: &[
        "fare_id",
        "route_id",
        "origin_id",
        "destination_id",
        "contains_id",
    ],
    relations: &[Relation {
        name: "fare",
        target: EntityKind::FareAttribute,
        on: &[("fare_id", "fare_id")],
        cardinality: Cardinality::ManyToOne,
    }],
};

static SHAPE: EntityDef = EntityDef {
    kind: EntityKind::Shape,
    table: "shapes",
    file_name: "shapes.txt",
    columns: &[
        required("shape_id"),
        optional("shape_pt_lat"),
        optional("shape_pt_lon"),
        optional("shape_pt_sequence"),
        optional("shape_dist_traveled"),
    ],
    natural_key: &["shape_id", "shape_pt_sequence"],
    relations: &[],
};

static FEED_INFO: EntityDef = EntityDef {
    kind: EntityKind::FeedInfo,
    table: "feed_info",
    file_name: "feed_info.txt",
    columns: &[
        optional("feed_publisher_name"),
        optional("feed_publisher_url"),
        optional("feed_lang"),
        optional("feed_start_date"),
        optional("feed_end_date"),
        optional("feed_version"),
    ],
    natural_key: &["feed_publisher_name"],
    relations: &[],
};

// Columns cover the legacy GTFS-JP layout (trans_id/lang) and the GTFS
// layout (table_name/field_name/language/record_id/field_value).
static TRANSLATION: EntityDef = EntityDef {
    kind: EntityKind::Translation,
    table: "translations",
    file_name: "translations.txt",
    columns: &[
        optional("trans_id"),
        optional("lang"),
        required("translation"),
        optional("table_name"),
        optional("field_name"),
        optional("language"),
        optional("record_id"),
        optional("record_sub_id"),
        optional("field_value"),
    ],
    natural_key: &["trans_id", "lang"],
    relations: &[
        Relation {
            name: "stop_by_id",
            target: EntityKind::Stop,
            on: &[("record_id", "stop_id")],
            cardinality: Cardinality::ManyToOne,
        },
        Relation {
            name: "stop_by_name",
            target: EntityKind::Stop,
            on: &[("field_value", "stop_name")],
            cardinality: Cardinality::ManyToOne,
        },
    ],
};
