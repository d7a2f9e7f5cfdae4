use crate::render::{Context, Flow};
use crate::types::node::{BlockBody, Document, Node};
use crate::Result;

impl BlockBody {
    /// Renders every node in order.
    ///
    /// Stops early and returns the interrupt if a `break` or `continue` was
    /// raised and not consumed by a nested loop.
    pub fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<Flow> {
        ctx.limits().add_render_score(self.nodes.len())?;
        for node in &self.nodes {
            match node {
                Node::Text(text) => {
                    ctx.limits().add_render_length(text.len())?;
                    out.push_str(text);
                }
                Node::Output(variable) => {
                    let text = match variable.evaluate(ctx) {
                        Ok(value) => value.to_output(),
                        Err(err) => ctx.handle_error(err, variable.line)?,
                    };
                    ctx.limits().add_render_length(text.len())?;
                    out.push_str(&text);
                }
                Node::Tag(tag) => {
                    let mut buf = String::new();
                    let (flow, failed) = match tag.render(ctx, &mut buf) {
                        Ok(flow) => (flow, false),
                        Err(err) => {
                            buf = ctx.handle_error(err, tag.line_number())?;
                            (Flow::Normal, true)
                        }
                    };
                    ctx.limits().add_render_length(buf.len())?;
                    if failed || !tag.blank() {
                        out.push_str(&buf);
                    }
                    if flow != Flow::Normal {
                        return Ok(flow);
                    }
                }
            }
        }
        Ok(Flow::Normal)
    }
}

impl Document {
    pub(crate) fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<()> {
        let flow = self.body.render(ctx, out)?;
        if flow != Flow::Normal {
            tracing::warn!(?flow, "interrupt was not consumed by any loop");
        }
        Ok(())
    }
}
