//! HTML for the `/todo` pages.

use serde::Serialize;

use crate::{
    models::{Todo, TodoSummary},
    pagination::{PageResult, SearchType},
};

/// Query string of a pagination link; carries the active filter along.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageLink<'a> {
    page: u64,
    size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_type: Option<SearchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<h1>{}</h1>\n{}\n</body>\n</html>\n",
        escape(title),
        escape(title),
        body
    )
}

pub fn list(page: &PageResult<TodoSummary>) -> Result<String, serde_urlencoded::ser::Error> {
    let mut body = String::new();

    body.push_str(&search_form(page));
    body.push_str("<p><a href=\"/todo/register\">New todo</a></p>\n");
    body.push_str(&format!("<p>{} todo(s)</p>\n", page.total));

    body.push_str(
        "<table>\n<thead><tr><th>#</th><th>Title</th><th>Author</th><th>Due</th><th>Done</th></tr></thead>\n<tbody>\n",
    );
    for todo in &page.dto_list {
        body.push_str(&format!(
            "<tr><td>{id}</td><td><a href=\"/todo/read?id={id}\">{title}</a></td><td>{author}</td><td>{due}</td><td>{done}</td></tr>\n",
            id = todo.id,
            title = escape(&todo.title),
            author = escape(&todo.author_name),
            due = todo.due_date.map(|d| d.to_string()).unwrap_or_default(),
            done = if todo.completed { "yes" } else { "no" },
        ));
    }
    body.push_str("</tbody>\n</table>\n");

    body.push_str(&pagination(page)?);
    Ok(layout("Todo list", &body))
}

fn search_form(page: &PageResult<TodoSummary>) -> String {
    let mut options = String::new();
    for search_type in [SearchType::All, SearchType::Title, SearchType::Author] {
        let selected = if search_type == page.search_type {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            search_type.as_str(),
            selected
        ));
    }

    format!(
        "<form method=\"get\" action=\"/todo\">\
         <input type=\"hidden\" name=\"size\" value=\"{size}\">\
         <input name=\"authorName\" placeholder=\"Author\" value=\"{author}\">\
         <select name=\"searchType\">{options}</select>\
         <input name=\"query\" placeholder=\"Search\" value=\"{query}\">\
         <button type=\"submit\">Search</button></form>\n",
        size = page.size,
        author = escape(page.author_name.as_deref().unwrap_or_default()),
        query = escape(page.query.as_deref().unwrap_or_default()),
    )
}

fn pagination(page: &PageResult<TodoSummary>) -> Result<String, serde_urlencoded::ser::Error> {
    let window = page.window();
    let mut nav = String::from("<nav class=\"pagination\">");
    if window.prev {
        nav.push_str(&format!("<a href=\"{}\">&laquo; Prev</a> ", page_href(page, window.start - 1)?));
    }
    for number in window.start..=window.end {
        if number == u64::from(page.page) {
            nav.push_str(&format!("<strong>{number}</strong> "));
        } else {
            nav.push_str(&format!("<a href=\"{}\">{number}</a> ", page_href(page, number)?));
        }
    }
    if window.next {
        nav.push_str(&format!("<a href=\"{}\">Next &raquo;</a>", page_href(page, window.end + 1)?));
    }
    nav.push_str("</nav>\n");
    Ok(nav)
}

/// Link to page `number`, HTML-escaped for use in an attribute.
fn page_href<T>(page: &PageResult<T>, number: u64) -> Result<String, serde_urlencoded::ser::Error> {
    let link = PageLink {
        page: number,
        size: page.size,
        author_name: page.author_name.as_deref(),
        search_type: page.query.as_ref().map(|_| page.search_type),
        query: page.query.as_deref(),
    };
    Ok(escape(&format!("/todo?{}", serde_urlencoded::to_string(&link)?)))
}

pub fn detail(todo: &Todo) -> String {
    let body = format!(
        "<dl>\
         <dt>Title</dt><dd>{title}</dd>\
         <dt>Description</dt><dd>{description}</dd>\
         <dt>Author</dt><dd>{author}</dd>\
         <dt>Email</dt><dd>{email}</dd>\
         <dt>Due</dt><dd>{due}</dd>\
         <dt>Done</dt><dd>{done}</dd>\
         <dt>Created</dt><dd>{created}</dd>\
         <dt>Updated</dt><dd>{updated}</dd>\
         </dl>\n\
         <form method=\"get\" action=\"/todo/update/{id}\">\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\
         <button type=\"submit\">Edit</button></form>\n\
         <form method=\"post\" action=\"/todo/{id}/delete\">\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\
         <button type=\"submit\">Delete</button></form>\n\
         <p><a href=\"/todo\">Back to list</a></p>\n",
        id = todo.id,
        title = escape(&todo.title),
        description = escape(todo.description.as_deref().unwrap_or_default()),
        author = escape(&todo.author_name),
        email = escape(todo.email.as_deref().unwrap_or_default()),
        due = todo.due_date.map(|d| d.to_string()).unwrap_or_default(),
        done = if todo.completed { "yes" } else { "no" },
        created = todo.created_at.format("%Y-%m-%d %H:%M"),
        updated = todo.updated_at.format("%Y-%m-%d %H:%M"),
    );
    layout("Todo", &body)
}

pub fn register_form() -> String {
    let body = "<form method=\"post\" action=\"/todo/register\">\
         <p><input name=\"title\" placeholder=\"Title\" maxlength=\"200\" required></p>\
         <p><textarea name=\"description\" placeholder=\"Description\"></textarea></p>\
         <p><input type=\"date\" name=\"dueDate\"></p>\
         <p><input name=\"authorName\" placeholder=\"Author\" maxlength=\"50\"></p>\
         <p><input type=\"email\" name=\"email\" placeholder=\"Email\"></p>\
         <p><input type=\"password\" name=\"password\" placeholder=\"Password\" required></p>\
         <button type=\"submit\">Register</button></form>\n\
         <p><a href=\"/todo\">Back to list</a></p>\n";
    layout("New todo", body)
}

pub fn update_form(todo: &Todo, password: &str) -> String {
    let (yes, no) = if todo.completed {
        (" selected", "")
    } else {
        ("", " selected")
    };
    let body = format!(
        "<form method=\"post\" action=\"/todo/update/{id}\">\
         <input type=\"hidden\" name=\"password\" value=\"{password}\">\
         <p><input name=\"title\" value=\"{title}\" maxlength=\"200\" required></p>\
         <p><textarea name=\"description\">{description}</textarea></p>\
         <p><input type=\"date\" name=\"dueDate\" value=\"{due}\"></p>\
         <p><select name=\"completed\"><option value=\"false\"{no}>open</option><option value=\"true\"{yes}>done</option></select></p>\
         <p><input name=\"authorName\" value=\"{author}\" maxlength=\"50\"></p>\
         <p><input type=\"email\" name=\"email\" value=\"{email}\"></p>\
         <button type=\"submit\">Save</button></form>\n\
         <p><a href=\"/todo/read?id={id}\">Cancel</a></p>\n",
        id = todo.id,
        password = escape(password),
        title = escape(&todo.title),
        description = escape(todo.description.as_deref().unwrap_or_default()),
        due = todo.due_date.map(|d| d.to_string()).unwrap_or_default(),
        author = escape(&todo.author_name),
        email = escape(todo.email.as_deref().unwrap_or_default()),
    );
    layout("Edit todo", &body)
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
