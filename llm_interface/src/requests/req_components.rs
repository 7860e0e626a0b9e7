/// Generation settings sent with every request of a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestConfig {
    /// The model name the server should route the request to.
    pub model: String,
    /// Controls the randomness of the model's output, between 0.0 and 2.0.
    ///
    /// Low values keep the replies close to the vocabulary spelling. `None` leaves the
    /// server default in place.
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens per reply.
    ///
    /// - For OpenAI API-compatible LLMs, this corresponds to the 'max_tokens' parameter.
    /// - For Ollama, this is the 'num_predict' option.
    pub max_tokens: Option<u32>,
}

impl RequestConfig {
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

pub trait RequestConfigTrait {
    fn request_config_mut(&mut self) -> &mut RequestConfig;

    fn model<S: Into<String>>(mut self, model: S) -> Self
    where
        Self: Sized,
    {
        self.request_config_mut().model = model.into();
        self
    }

    fn temperature(mut self, temperature: f32) -> Self
    where
        Self: Sized,
    {
        self.request_config_mut().temperature = Some(temperature);
        self
    }

    fn max_tokens(mut self, max_tokens: u32) -> Self
    where
        Self: Sized,
    {
        self.request_config_mut().max_tokens = Some(max_tokens);
        self
    }
}
