// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

//! End-to-end rendering of nested specs built through the spec builder.

use relq_catalog::{CatalogError, FieldPair, ForeignKey, RelId, SchemaMetadata};
use relq_spec::{
	ChildCollectionEntry, ConditionAnchor, FieldEntry, FromEntry, Join, JoinType, OrderBy, ParentChildCondition,
	ParentReferenceEntry, QuerySpec, SelectEntry, SpecBuilder, TableFromEntry, WhereEntry,
};
use relq_sql::{Dialect, Mysql, Oracle, Postgres, RenderConfig, RenderError, Sqlite, render};
use relq_type::IdentCase;

fn field(alias: &str, name: &str) -> SelectEntry {
	SelectEntry::Field(FieldEntry {
		field: name.into(),
		table_alias: alias.into(),
		output_name: name.into(),
		display_order: None,
		comment: None,
	})
}

fn table(name: &str, alias: &str) -> FromEntry {
	FromEntry::Table(TableFromEntry {
		rel: RelId::new(None, name, IdentCase::FoldLower),
		alias: alias.into(),
		join: None,
		comment: None,
	})
}

fn correlation(child: &str, fk: &str, parent: &str, pk: &str) -> ParentChildCondition {
	ParentChildCondition {
		child_alias: child.into(),
		parent_alias: parent.into(),
		pairs: vec![FieldPair {
			foreign_key_field: fk.into(),
			primary_key_field: pk.into(),
		}],
		anchor: ConditionAnchor::Child,
	}
}

/// Books with their reviews aggregated into one JSON array per book,
/// built bottom-up through builders the way a frontend would.
fn books_with_reviews(dialect: &dyn Dialect) -> QuerySpec {
	let mut reviews = SpecBuilder::new(dialect.reserved_words());
	let review_alias = reviews.create_table_alias("reviews");
	reviews.add_select_entry(field(&review_alias, "stars"));
	reviews.add_from_entry(table("reviews", &review_alias));
	reviews.add_where_entry(WhereEntry::ParentChild(correlation(&review_alias, "book_id", "b", "id")));
	reviews.set_wrap_properties_in_object();
	reviews.set_aggregate_to_array();
	let reviews = reviews.freeze();

	let mut books = SpecBuilder::new(dialect.reserved_words());
	let book_alias = books.create_table_alias("books");
	books.add_select_entry(field(&book_alias, "title"));
	books.add_select_entry(SelectEntry::ChildCollection(ChildCollectionEntry {
		output_name: "reviews".into(),
		collection_spec: Box::new(reviews),
		display_order: None,
	}));
	books.add_from_entry(table("books", &book_alias));
	books.set_wrap_properties_in_object();
	books.freeze()
}

#[test]
fn test_books_with_reviews_postgres() {
	let spec = books_with_reviews(&Postgres);
	let expected = "\
select
  jsonb_build_object('title', q.title, 'reviews', q.reviews) json
from (
  select
    b.title as title,
    (
      select
        coalesce(jsonb_agg(jsonb_build_object('stars', q.stars)), '[]'::jsonb) json
      from (
        select
          r.stars as stars
        from
          reviews r
        where r.book_id = b.id
      ) q
    ) as reviews
  from
    books b
) q";
	assert_eq!(render(&spec, &Postgres, &RenderConfig::default()).unwrap(), expected);
}

#[test]
fn test_books_with_reviews_per_dialect_idioms() {
	for (dialect, aggregate) in [
		(&Postgres as &dyn Dialect, "jsonb_agg("),
		(&Mysql, "json_arrayagg("),
		(&Oracle, "json_arrayagg("),
		(&Sqlite, "json_group_array("),
	] {
		let spec = books_with_reviews(dialect);
		let sql = render(&spec, dialect, &RenderConfig::default()).unwrap();
		assert!(sql.contains(aggregate), "{} output missing {}", dialect.name(), aggregate);
		assert!(sql.contains("where r.book_id = b.id"), "{} lost the correlation", dialect.name());
	}
}

#[test]
fn test_oracle_aggregate_returns_clob() {
	let spec = books_with_reviews(&Oracle);
	let sql = render(&spec, &Oracle, &RenderConfig::default()).unwrap();
	assert!(sql.contains("returning clob), to_clob('[]'))"));
}

#[test]
fn test_mysql_ordered_aggregation_fails_fast() {
	let mut reviews = SpecBuilder::new(Mysql.reserved_words());
	reviews.add_select_entry(field("r", "stars"));
	reviews.add_from_entry(table("reviews", "r"));
	reviews.set_wrap_properties_in_object();
	reviews.set_aggregate_to_array();
	reviews.set_aggregate_order_by("$$.stars desc");
	let spec = reviews.freeze();

	assert_eq!(
		render(&spec, &Mysql, &RenderConfig::default()),
		Err(RenderError::OrderedAggregationUnsupported {
			dialect: "mysql",
			order: "q.stars desc".to_string(),
		})
	);
}

#[test]
fn test_parent_reference_subquery() {
	let mut author = SpecBuilder::new(Postgres.reserved_words());
	author.add_select_entry(field("a", "name"));
	author.add_from_entry(table("authors", "a"));
	author.add_where_entry(WhereEntry::ParentChild(ParentChildCondition {
		child_alias: "b".into(),
		parent_alias: "a".into(),
		pairs: vec![FieldPair {
			foreign_key_field: "author_id".into(),
			primary_key_field: "id".into(),
		}],
		anchor: ConditionAnchor::Parent,
	}));
	author.set_wrap_properties_in_object();
	let author = author.freeze();

	let mut books = SpecBuilder::new(Postgres.reserved_words());
	books.add_select_entry(field("b", "title"));
	books.add_select_entry(SelectEntry::ParentReference(ParentReferenceEntry {
		output_name: "author".into(),
		parent_spec: Box::new(author),
		display_order: None,
	}));
	books.add_from_entry(table("books", "b"));
	let spec = books.freeze();

	let sql = render(&spec, &Postgres, &RenderConfig::default()).unwrap();
	assert!(sql.contains(") as author"));
	assert!(sql.contains("jsonb_build_object('name', q.name) json"));
	assert!(sql.contains("where b.author_id = a.id"));
}

#[test]
fn test_builder_aliases_respect_dialect_reserved_words() {
	// 'or' is reserved in Postgres, so order_records cannot get it raw.
	let mut builder = SpecBuilder::new(Postgres.reserved_words());
	assert_eq!(builder.create_table_alias("order_records"), "or_");
	assert_eq!(builder.create_table_alias("order_rows"), "or1");
}

#[test]
fn test_flat_spec_round_trips_unwrapped() {
	let mut builder = SpecBuilder::new(Sqlite.reserved_words());
	let alias = builder.create_table_alias("books");
	builder.add_select_entry(field(&alias, "id"));
	builder.add_select_entry(field(&alias, "title"));
	builder.add_from_entry(table("books", &alias));
	builder.set_order_by(OrderBy {
		expression: "$$.title".into(),
		table_alias: alias.clone(),
	});
	let spec = builder.freeze();

	assert_eq!(
		render(&spec, &Sqlite, &RenderConfig::default()).unwrap(),
		"select\n  b.id as id,\n  b.title as title\nfrom\n  books b\norder by b.title"
	);
}

/// Single-constraint provider standing in for a real schema reader.
struct OneKey {
	key: ForeignKey,
}

impl SchemaMetadata for OneKey {
	fn primary_key_columns(&self, _rel: &RelId, alias: Option<&str>) -> Result<Vec<String>, CatalogError> {
		Ok(vec![match alias {
			Some(a) => format!("{a}.id"),
			None => "id".to_string(),
		}])
	}

	fn foreign_key(
		&self,
		from: &RelId,
		to: &RelId,
		_field_filter: Option<&[String]>,
	) -> Result<Option<ForeignKey>, CatalogError> {
		Ok((&self.key.from == from && &self.key.to == to).then(|| self.key.clone()))
	}
}

#[test]
fn test_metadata_resolved_join_renders() {
	let books = RelId::new(None, "books", IdentCase::FoldLower);
	let authors = RelId::new(None, "authors", IdentCase::FoldLower);
	let metadata = OneKey {
		key: ForeignKey {
			from: books.clone(),
			to: authors.clone(),
			pairs: vec![FieldPair {
				foreign_key_field: "author_id".into(),
				primary_key_field: "id".into(),
			}],
		},
	};

	let mut builder = SpecBuilder::new(Postgres.reserved_words());
	let book_alias = builder.create_table_alias("books");
	let author_alias = builder.create_table_alias("authors");
	let condition = ParentChildCondition::resolve(
		&metadata,
		(&books, &book_alias),
		(&authors, &author_alias),
		None,
		ConditionAnchor::Parent,
	)
	.unwrap();

	builder.add_select_entry(field(&book_alias, "title"));
	builder.add_select_entry(field(&author_alias, "name"));
	builder.add_from_entry(table("books", &book_alias));
	builder.add_from_entry(FromEntry::Table(TableFromEntry {
		rel: authors,
		alias: author_alias.clone(),
		join: Some(Join {
			join_type: JoinType::Left,
			condition,
		}),
		comment: None,
	}));
	let spec = builder.freeze();

	assert_eq!(
		render(&spec, &Postgres, &RenderConfig::default()).unwrap(),
		"select\n  b.title as title,\n  a.name as name\nfrom\n  books b\n  left join authors a on b.author_id \
		 = a.id"
	);
}

#[test]
fn test_rendering_shared_spec_is_reentrant() {
	let spec = books_with_reviews(&Postgres);
	let config = RenderConfig::default();
	let first = std::thread::scope(|scope| {
		let handle = scope.spawn(|| render(&spec, &Postgres, &config).unwrap());
		let here = render(&spec, &Postgres, &config).unwrap();
		let there = handle.join().unwrap();
		assert_eq!(here, there);
		here
	});
	assert_eq!(first, render(&spec, &Postgres, &config).unwrap());
}
