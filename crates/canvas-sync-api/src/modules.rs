//! Module item listing over GraphQL
//!
//! `POST /api/graphql` with a form-encoded body walks
//! `course.modulesConnection` one page at a time. The `endCursor` of a
//! page is only meaningful for the request that immediately follows it,
//! so pages are fetched strictly in sequence.

use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use canvas_sync_core::domain::ModuleItem;

use crate::client::CanvasClient;
use crate::ApiError;

const MODULES_QUERY: &str = r#"
query ModulesQuery($courseId: ID!, $pageCursor: String) {
  course(id: $courseId) {
    modulesConnection(after: $pageCursor) {
      nodes {
        name
        id
        moduleItems {
          content {
            ... on File {
              __typename
              id
              _id
              displayName
              modules { name }
            }
            ... on SubHeader {
              __typename
              title
              modules { name }
            }
          }
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

/// Pagination state returned with every connection page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ModulesData>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ModulesData {
    course: Option<CourseNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseNode {
    modules_connection: ModulesConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModulesConnection {
    #[serde(default)]
    nodes: Vec<ModuleNode>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleNode {
    #[allow(dead_code)]
    name: String,
    #[serde(default)]
    module_items: Vec<ModuleItem>,
}

/// Fetch one page of module items
///
/// # Arguments
/// * `course_id` - Course to list
/// * `after` - `endCursor` of the previous page; empty for the first page
pub async fn fetch_module_page(
    client: &CanvasClient,
    course_id: i64,
    after: &str,
) -> Result<(Vec<ModuleItem>, PageInfo), ApiError> {
    let url = client.build_plain_url("/api/graphql")?;
    let course = course_id.to_string();
    let form = [
        ("query", MODULES_QUERY),
        ("variables[courseId]", course.as_str()),
        ("variables[pageCursor]", after),
    ];

    let request = client.request(Method::POST, &url).form(&form);
    let (response, _) = client.execute::<GraphQlResponse>(&url, request).await?;

    if !response.errors.is_empty() {
        return Err(ApiError::GraphQl {
            url,
            messages: response.errors.into_iter().map(|e| e.message).collect(),
        });
    }

    let Some(course) = response.data.and_then(|d| d.course) else {
        return Err(ApiError::GraphQl {
            url,
            messages: vec![format!("course {course_id} not found")],
        });
    };

    let connection = course.modules_connection;
    let items: Vec<ModuleItem> = connection
        .nodes
        .into_iter()
        .flat_map(|node| node.module_items)
        .collect();

    Ok((items, connection.page_info))
}

/// Fetch every module item of a course, in emission order
///
/// Stops when `hasNextPage` is false. A page that claims a successor but
/// does not move the cursor forward is reported as an error instead of
/// being requested again.
pub async fn fetch_all_module_items(
    client: &CanvasClient,
    course_id: i64,
) -> Result<Vec<ModuleItem>, ApiError> {
    let mut items = Vec::new();
    let mut cursor = String::new();
    let mut page = 0u32;

    loop {
        let (page_items, info) = fetch_module_page(client, course_id, &cursor).await?;
        page += 1;
        debug!(
            page,
            items = page_items.len(),
            has_next = info.has_next_page,
            "Received module page"
        );
        items.extend(page_items);

        if !info.has_next_page {
            break;
        }
        match info.end_cursor {
            Some(next) if next != cursor => cursor = next,
            _ => {
                return Err(ApiError::GraphQl {
                    url: client.build_plain_url("/api/graphql")?,
                    messages: vec![format!("page {page} reported hasNextPage without a new endCursor")],
                })
            }
        }
    }

    Ok(items)
}
