//! HTML rendering.
//!
//! Pure string builders from view state to markup; identical input gives
//! identical output. `page` produces the full document served on `GET /`,
//! `view_html` the live region that gets re-sent over the socket on every
//! change. Interactive elements carry `data-click` / `data-submit` /
//! `data-change` attributes that the inline client script turns into typed
//! events. Everything user-entered goes through `escape`.

use crate::changeset::Changeset;
use crate::model::{Branch, BranchField};
use crate::view::BranchView;

const INPUT_CLASS: &str = "w-full h-8 p-2 bg-gray-100";
const EDIT_INPUT_CLASS: &str = "w-full border h-8 p-2 bg-gray-100";
const ERROR_CLASS: &str = "text-red-500 text-sm";
const BRANCH_PHOTO: &str =
    "https://media.wired.com/photos/59269cd37034dc5f91bec0f1/master/pass/GoogleMapTA.jpg";

/// Minimal HTML entity escape for text and attribute positions.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Full document for the initial page load. The live region carries the
/// server-rendered view so the list is visible before the socket connects.
pub fn page(view: &BranchView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Cosmos Bank</title>
<script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-slate-200">
<div id="view">{live}</div>
<script>{client}</script>
</body>
</html>
"#,
        live = view_html(view),
        client = CLIENT_JS,
    )
}

/// The live region: heading, create form, branch cards.
pub fn view_html(view: &BranchView) -> String {
    let pristine = Changeset::pristine();
    // The changeset renders in the form its input came from: a base id
    // ties it to that row's edit form, no base id ties it to the create
    // form. The other form falls back to clean values.
    let create_cs = if view.changeset.base_id.is_none() {
        &view.changeset
    } else {
        &pristine
    };

    let mut cards = String::new();
    for branch in &view.branches {
        if view.is_editing(&branch.id) {
            let edit_cs = if view.changeset.base_id.as_deref() == Some(branch.id.as_str()) {
                view.changeset.clone()
            } else {
                Changeset::seeded(branch)
            };
            cards.push_str(&branch_card(branch, Some(&edit_cs), &view.csrf_token));
        } else {
            cards.push_str(&branch_card(branch, None, &view.csrf_token));
        }
    }

    format!(
        r#"<h1 class="text-green-400 text-3xl mb-6 text-center">Cosmos Bank</h1>
<div class="flex w-full justify-center">
  <div id="branchForm" class="bg-slate-100 w-[25rem] mb-8 rounded-xl p-8 bg-white">
{form}
  </div>
</div>
<div id="branches" class="flex flex-wrap space-x-4 items-center justify-center">
{cards}
</div>
"#,
        form = create_form(create_cs, &view.csrf_token),
        cards = cards,
    )
}

fn create_form(cs: &Changeset, csrf_token: &str) -> String {
    let mut fields = String::new();
    for field in BranchField::ALL {
        fields.push_str(&format!(
            "    <div>\n      {input}\n      {error}\n    </div>\n",
            input = text_input(cs, field, field.placeholder(), INPUT_CLASS),
            error = error_tag(cs, field),
        ));
    }
    format!(
        r#"<form data-submit="save" data-change="validate">
  {csrf}
  <div class="space-y-4">
{fields}  </div>
  <div class="flex justify-center bg-blue-700 mt-8 p-2 text-white w-full rounded-md">
    <button type="submit">Add Branch</button>
  </div>
</form>"#,
        csrf = csrf_input(csrf_token),
        fields = fields,
    )
}

fn branch_card(branch: &Branch, edit_cs: Option<&Changeset>, csrf_token: &str) -> String {
    let actions = match edit_cs {
        Some(cs) => edit_form(cs, csrf_token),
        None => action_buttons(&branch.id),
    };
    format!(
        r#"<figure id="{id}" class="flex bg-slate-100 w-[30rem] mt-4 rounded-xl p-8 md:p-0 bg-white">
  <img class="w-24 h-24 md:w-48 md:h-auto md:rounded-l-lg" src="{photo}" alt="" width="384" height="512">
  <div class="pt-6 md:p-8 text-center md:text-left">
    <div class="space-y-1">
      <p class="text-base font-normal">Branch name: {name}</p>
      <p class="text-base font-normal">Address: {address}</p>
      <p class="text-base font-normal">Contact: {contact}</p>
      <p class="text-base font-normal">Total Staff: 24</p>
    </div>
    {status}
    <div class="flex space-x-2 items-center mt-8">
      <img class="w-10 h-10 rounded-full" src="{photo}" alt="">
      <figcaption class="font-medium">
        <div class="text-sky-500 dark:text-sky-400">{manager}</div>
        <div class="text-slate-700 dark:text-slate-500">Branch Manager</div>
      </figcaption>
    </div>
    {actions}
  </div>
</figure>
"#,
        id = escape(&branch.id),
        photo = BRANCH_PHOTO,
        name = escape(&branch.name),
        address = escape(&branch.address),
        contact = escape(&branch.contact),
        manager = escape(&branch.manager),
        status = status_button(branch),
        actions = actions,
    )
}

fn status_button(branch: &Branch) -> String {
    let (color, label) = if branch.status {
        ("bg-red-700", "Disabled")
    } else {
        ("bg-green-700", "Activated")
    };
    format!(
        r#"<button class="{color} px-4 py-1.5 rounded-md text-white" data-click="toggle-status" data-id="{id}">{label}</button>"#,
        color = color,
        id = escape(&branch.id),
        label = label,
    )
}

fn action_buttons(id: &str) -> String {
    let id = escape(id);
    format!(
        r#"<button class="bg-blue-700 text-white text-sm py-2 px-4 rounded-md" data-click="edit" data-id="{id}">Edit</button>
    <button class="bg-red-700 text-white text-sm py-2 px-4 rounded-md" data-click="delete" data-id="{id}">Delete</button>"#,
        id = id,
    )
}

fn edit_form(cs: &Changeset, csrf_token: &str) -> String {
    let mut fields = String::new();
    for field in BranchField::ALL {
        fields.push_str(&format!(
            "      <div class=\"field\">\n        {input}\n        {error}\n      </div>\n",
            input = text_input(cs, field, field.as_str(), EDIT_INPUT_CLASS),
            error = error_tag(cs, field),
        ));
    }
    format!(
        r#"<form data-submit="update">
      {csrf}
      <div class="space-y-2">
{fields}      <div class="flex justify-center bg-blue-700 mt-8 p-2 text-white w-full rounded-md">
        <button type="submit">Update Branch</button>
      </div>
      </div>
    </form>"#,
        csrf = csrf_input(csrf_token),
        fields = fields,
    )
}

fn text_input(cs: &Changeset, field: BranchField, placeholder: &str, class: &str) -> String {
    format!(
        r#"<input type="text" name="{name}" value="{value}" placeholder="{placeholder}" autocomplete="off" class="{class}">"#,
        name = field.as_str(),
        value = escape(cs.value(field)),
        placeholder = placeholder,
        class = class,
    )
}

fn error_tag(cs: &Changeset, field: BranchField) -> String {
    match cs.error(field) {
        Some(message) => format!(
            r#"<span class="{class}" data-error="{name}">{message}</span>"#,
            class = ERROR_CLASS,
            name = field.as_str(),
            message = escape(message),
        ),
        None => String::new(),
    }
}

fn csrf_input(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="_csrf_token" value="{token}">"#,
        token = escape(token),
    )
}

/// Browser-side glue: one socket, typed JSON events out, rendered HTML in.
/// Keeps focus and caret across live-region swaps and debounces the
/// as-you-type validation by a second.
const CLIENT_JS: &str = r#"(() => {
  const view = document.getElementById("view");
  const proto = location.protocol === "https:" ? "wss://" : "ws://";
  const ws = new WebSocket(proto + location.host + "/ws");
  let debounceTimer = null;

  const send = (event) => {
    if (ws.readyState === WebSocket.OPEN) ws.send(JSON.stringify(event));
  };

  const formPayload = (form) => {
    const payload = {};
    new FormData(form).forEach((value, key) => { payload[key] = value; });
    return payload;
  };

  ws.addEventListener("message", (msg) => {
    const frame = JSON.parse(msg.data);
    if (frame.type !== "Render") return;
    const active = document.activeElement;
    const focusName = active && active.name ? active.name : null;
    const formScope = active && active.form && active.form.dataset.submit
      ? 'form[data-submit="' + active.form.dataset.submit + '"] '
      : "";
    const caret = focusName && active.selectionStart != null ? active.selectionStart : null;
    view.innerHTML = frame.data.html;
    if (focusName) {
      const again = view.querySelector(formScope + '[name="' + focusName + '"]');
      if (again) {
        again.focus();
        if (caret != null) again.setSelectionRange(caret, caret);
      }
    }
  });

  view.addEventListener("click", (e) => {
    const el = e.target.closest("[data-click]");
    if (!el) return;
    send({ type: el.dataset.click, id: el.dataset.id });
  });

  view.addEventListener("submit", (e) => {
    const form = e.target.closest("form[data-submit]");
    if (!form) return;
    e.preventDefault();
    send({ type: form.dataset.submit, ...formPayload(form) });
  });

  view.addEventListener("input", (e) => {
    const form = e.target.closest("form[data-change]");
    if (!form) return;
    clearTimeout(debounceTimer);
    debounceTimer = setTimeout(() => {
      send({ type: form.dataset.change, ...formPayload(form) });
    }, 1000);
  });
})();
"#;
