//! Test double for [`GraphicsDevice`] that journals every call.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::device::{BufferTarget, GraphicsDevice, ShaderStage};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateShader(ShaderStage, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateBuffer(u32),
    BindBuffer(BufferTarget, Option<u32>),
    BufferDataF32(BufferTarget, usize),
    BufferDataU16(BufferTarget, usize),
    DeleteBuffer(u32),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    EnableAttribute(u32, i32),
    SetClearColor([f32; 4]),
    EnableDepthTest,
    Clear,
    Viewport(i32, i32),
    UniformMatrix4(String, [f32; 16]),
    UniformVec3(String, [f32; 3]),
    UniformVec4(String, [f32; 4]),
    DrawTriangles(i32),
}

#[derive(Default)]
struct Journal {
    next_id: u32,
    calls: Vec<Call>,
    failed_shaders: HashSet<u32>,
    link_failure: Option<String>,
    hidden_uniforms: Vec<String>,
    hidden_attributes: Vec<String>,
    pending_errors: VecDeque<u32>,
    draw_failure: Option<u32>,
    context_lost: bool,
    live: HashSet<u32>,
    bound_vao: Option<u32>,
    bound_array: Option<u32>,
    bound_element: Option<u32>,
}

impl Journal {
    fn create(&mut self) -> u32 {
        self.next_id += 1;
        self.live.insert(self.next_id);
        self.next_id
    }

    fn delete(&mut self, id: u32) {
        self.live.remove(&id);
    }
}

/// Cloning shares the journal, so a test can keep a handle while the
/// context owns another.
#[derive(Clone, Default)]
pub(crate) struct RecordingDevice {
    journal: Rc<RefCell<Journal>>,
}

impl RecordingDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.journal.borrow().calls.clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.journal.borrow().calls.iter().filter(|c| pred(*c)).count()
    }

    pub(crate) fn draw_calls(&self) -> Vec<i32> {
        self.journal
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::DrawTriangles(count) => Some(*count),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn viewports(&self) -> Vec<(i32, i32)> {
        self.journal
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Viewport(w, h) => Some((*w, *h)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_vec3(&self, name: &str) -> Option<[f32; 3]> {
        self.journal.borrow().calls.iter().rev().find_map(|c| match c {
            Call::UniformVec3(uniform, value) if uniform == name => Some(*value),
            _ => None,
        })
    }

    pub(crate) fn last_vec4(&self, name: &str) -> Option<[f32; 4]> {
        self.journal.borrow().calls.iter().rev().find_map(|c| match c {
            Call::UniformVec4(uniform, value) if uniform == name => Some(*value),
            _ => None,
        })
    }

    pub(crate) fn last_matrix(&self, name: &str) -> Option<[f32; 16]> {
        self.journal.borrow().calls.iter().rev().find_map(|c| match c {
            Call::UniformMatrix4(uniform, value) if uniform == name => Some(*value),
            _ => None,
        })
    }

    pub(crate) fn clear_calls(&self) {
        self.journal.borrow_mut().calls.clear();
    }

    pub(crate) fn fail_link(&self, log: &str) {
        self.journal.borrow_mut().link_failure = Some(log.to_owned());
    }

    pub(crate) fn hide_uniform(&self, name: &str) {
        self.journal.borrow_mut().hidden_uniforms.push(name.to_owned());
    }

    pub(crate) fn hide_attribute(&self, name: &str) {
        self.journal.borrow_mut().hidden_attributes.push(name.to_owned());
    }

    pub(crate) fn raise_error(&self, code: u32) {
        self.journal.borrow_mut().pending_errors.push_back(code);
    }

    /// The next draw call sets `code` as its error flag.
    pub(crate) fn fail_next_draw(&self, code: u32) {
        self.journal.borrow_mut().draw_failure = Some(code);
    }

    pub(crate) fn lose_context(&self) {
        self.journal.borrow_mut().context_lost = true;
    }

    pub(crate) fn has_bindings(&self) -> bool {
        let journal = self.journal.borrow();
        journal.bound_vao.is_some() || journal.bound_array.is_some() || journal.bound_element.is_some()
    }

    pub(crate) fn live_objects(&self) -> usize {
        self.journal.borrow().live.len()
    }

    fn record(&self, call: Call) {
        self.journal.borrow_mut().calls.push(call);
    }
}

/// Rough stand-in for a GLSL front end: needs a `main` and balanced
/// delimiters.
fn looks_valid(source: &str) -> bool {
    let mut depth = [0i32; 2];
    for ch in source.chars() {
        match ch {
            '{' => depth[0] += 1,
            '}' => depth[0] -= 1,
            '(' => depth[1] += 1,
            ')' => depth[1] -= 1,
            _ => {}
        }
        if depth.iter().any(|d| *d < 0) {
            return false;
        }
    }
    source.contains("main") && depth == [0, 0]
}

impl GraphicsDevice for RecordingDevice {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = String;

    fn create_shader(&self, stage: ShaderStage) -> Option<u32> {
        let id = self.journal.borrow_mut().create();
        self.record(Call::CreateShader(stage, id));
        Some(id)
    }

    fn compile_shader(&self, shader: &u32, source: &str) {
        if !looks_valid(source) {
            self.journal.borrow_mut().failed_shaders.insert(*shader);
        }
        self.record(Call::CompileShader(*shader));
    }

    fn shader_compiled(&self, shader: &u32) -> bool {
        !self.journal.borrow().failed_shaders.contains(shader)
    }

    fn shader_info_log(&self, shader: &u32) -> Option<String> {
        if self.shader_compiled(shader) {
            Some(String::new())
        } else {
            Some("ERROR: 0:1: syntax error".into())
        }
    }

    fn delete_shader(&self, shader: &u32) {
        self.journal.borrow_mut().delete(*shader);
        self.record(Call::DeleteShader(*shader));
    }

    fn create_program(&self) -> Option<u32> {
        let id = self.journal.borrow_mut().create();
        self.record(Call::CreateProgram(id));
        Some(id)
    }

    fn attach_shader(&self, program: &u32, shader: &u32) {
        self.record(Call::AttachShader(*program, *shader));
    }

    fn link_program(&self, program: &u32) {
        self.record(Call::LinkProgram(*program));
    }

    fn program_linked(&self, _program: &u32) -> bool {
        self.journal.borrow().link_failure.is_none()
    }

    fn program_info_log(&self, _program: &u32) -> Option<String> {
        self.journal.borrow().link_failure.clone()
    }

    fn use_program(&self, program: Option<&u32>) {
        self.record(Call::UseProgram(program.copied()));
    }

    fn delete_program(&self, program: &u32) {
        self.journal.borrow_mut().delete(*program);
        self.record(Call::DeleteProgram(*program));
    }

    fn attrib_location(&self, _program: &u32, name: &str) -> Option<u32> {
        if self.journal.borrow().hidden_attributes.iter().any(|n| n == name) {
            return None;
        }
        match name {
            "position" => Some(0),
            "normal" => Some(1),
            _ => Some(2),
        }
    }

    fn uniform_location(&self, _program: &u32, name: &str) -> Option<String> {
        if self.journal.borrow().hidden_uniforms.iter().any(|n| n == name) {
            None
        } else {
            Some(name.to_owned())
        }
    }

    fn create_buffer(&self) -> Option<u32> {
        let id = self.journal.borrow_mut().create();
        self.record(Call::CreateBuffer(id));
        Some(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&u32>) {
        {
            let mut journal = self.journal.borrow_mut();
            match target {
                BufferTarget::Array => journal.bound_array = buffer.copied(),
                BufferTarget::ElementArray => journal.bound_element = buffer.copied(),
            }
        }
        self.record(Call::BindBuffer(target, buffer.copied()));
    }

    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32]) {
        self.record(Call::BufferDataF32(target, data.len()));
    }

    fn buffer_data_u16(&self, target: BufferTarget, data: &[u16]) {
        self.record(Call::BufferDataU16(target, data.len()));
    }

    fn delete_buffer(&self, buffer: &u32) {
        self.journal.borrow_mut().delete(*buffer);
        self.record(Call::DeleteBuffer(*buffer));
    }

    fn create_vertex_array(&self) -> Option<u32> {
        let id = self.journal.borrow_mut().create();
        self.record(Call::CreateVertexArray(id));
        Some(id)
    }

    fn bind_vertex_array(&self, vao: Option<&u32>) {
        self.journal.borrow_mut().bound_vao = vao.copied();
        self.record(Call::BindVertexArray(vao.copied()));
    }

    fn delete_vertex_array(&self, vao: &u32) {
        self.journal.borrow_mut().delete(*vao);
        self.record(Call::DeleteVertexArray(*vao));
    }

    fn enable_vertex_attribute(&self, location: u32, components: i32) {
        self.record(Call::EnableAttribute(location, components));
    }

    fn set_clear_color(&self, color: [f32; 4]) {
        self.record(Call::SetClearColor(color));
    }

    fn enable_depth_test(&self) {
        self.record(Call::EnableDepthTest);
    }

    fn clear(&self) {
        self.record(Call::Clear);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record(Call::Viewport(width, height));
    }

    fn uniform_matrix4(&self, location: &String, value: &[f32; 16]) {
        self.record(Call::UniformMatrix4(location.clone(), *value));
    }

    fn uniform_vec3(&self, location: &String, value: &[f32; 3]) {
        self.record(Call::UniformVec3(location.clone(), *value));
    }

    fn uniform_vec4(&self, location: &String, value: &[f32; 4]) {
        self.record(Call::UniformVec4(location.clone(), *value));
    }

    fn draw_triangles(&self, index_count: i32) {
        {
            let mut journal = self.journal.borrow_mut();
            if let Some(code) = journal.draw_failure.take() {
                journal.pending_errors.push_back(code);
            }
        }
        self.record(Call::DrawTriangles(index_count));
    }

    fn take_error(&self) -> Option<u32> {
        self.journal.borrow_mut().pending_errors.pop_front()
    }

    fn is_context_lost(&self) -> bool {
        self.journal.borrow().context_lost
    }
}

static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());
static CAPTURE_INIT: Once = Once::new();

struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Error
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            if let Ok(mut lines) = CAPTURED.lock() {
                lines.push(record.args().to_string());
            }
        }
    }

    fn flush(&self) {}
}

/// Routes error-level records into a buffer readable with
/// [`captured_errors`]. Idempotent.
pub(crate) fn capture_errors() {
    CAPTURE_INIT.call_once(|| {
        static LOGGER: CapturingLogger = CapturingLogger;
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Error);
        }
    });
}

/// Error-level records logged so far by any test in this binary.
pub(crate) fn captured_errors() -> Vec<String> {
    CAPTURED.lock().map(|lines| lines.clone()).unwrap_or_default()
}
