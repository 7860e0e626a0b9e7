use minijinja::{AutoEscape, Environment};

pub(crate) const SCENE: &str = "scene";
pub(crate) const FIRST_CHUNK: &str = "first_chunk";
pub(crate) const ADDITIONAL_CHUNK: &str = "additional_chunk";
pub(crate) const ANNOTATE: &str = "annotate";

const SCENE_TEMPLATE: &str = "We want to create a list of {{ target_name }}s in the following. \
We call this list targets_list.";

const FIRST_CHUNK_TEMPLATE: &str = "Here are some {{ target_name }}s that should be added to the \
targets_list: {{ labels }}. Please use the exact spelling that I provide to you.";

const ADDITIONAL_CHUNK_TEMPLATE: &str = "Here are some additional {{ target_name }}s I want you \
to add to the targets_list: {{ labels }}. Please use the exact spelling that I provide to you.";

const ANNOTATE_TEMPLATE: &str = concat!(
    "We now want to annotate a {{ document_name }} with the {{ target_name }}s provided in the targets_list.\n",
    "Given the following {{ document_name }}: {{ document }}\n",
    "{% if num_targets == 1 %}",
    "Please assign 1 suitable {{ target_name }} from the targets_list to the {{ document_name }}.\n",
    "This {{ target_name }} should be contained in the targets_list we created earlier and use the exact spelling of the {{ target_name }} in the targets_list.\n",
    "Please respond only with the 1 {{ target_name }} without any further text.",
    "{% else %}",
    "Please assign up to {{ num_targets }} suitable {{ target_name }}s from the targets_list to the {{ document_name }}.\n",
    "These {{ target_name }}s should be contained in the targets_list we created earlier and use the exact spelling of the {{ target_name }} in the targets_list.\n",
    "Please respond only with the {{ num_targets }} {{ target_name }}s separated by comma and without any further text.",
    "{% endif %}",
);

pub(crate) fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    // Labels and documents are plain text; nothing may be escaped.
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_template(SCENE, SCENE_TEMPLATE)?;
    env.add_template(FIRST_CHUNK, FIRST_CHUNK_TEMPLATE)?;
    env.add_template(ADDITIONAL_CHUNK, ADDITIONAL_CHUNK_TEMPLATE)?;
    env.add_template(ANNOTATE, ANNOTATE_TEMPLATE)?;
    Ok(env)
}
